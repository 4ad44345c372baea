//! Delivery Task and outcome types

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Message body, rendered as HTML or plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum MessageBody {
    Html(String),
    Text(String),
}

/// One outbound notification. Fire-once: a failed task is not retried, it
/// only falls through the channel chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryTask {
    pub to: String,
    pub subject: String,
    pub body: MessageBody,
    pub reply_to: Option<String>,
}

impl DeliveryTask {
    pub fn text(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: MessageBody::Text(body.into()),
            reply_to: None,
        }
    }

    pub fn html(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: MessageBody::Html(body.into()),
            reply_to: None,
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

/// Final result of delivering one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered { provider: String, message_id: String },
    Skipped { reason: String },
    /// No channel delivered; the message was only logged
    Simulated,
    /// A channel attempted and failed under `FailurePolicy::Surface`
    Failed { provider: String, error: String },
}

impl DeliveryOutcome {
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Delivered { provider, .. } | Self::Failed { provider, .. } => Some(provider),
            _ => None,
        }
    }
}

/// What an attempted-and-failed channel means for the rest of the chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Treat a send failure like a missing credential: try the next channel
    #[default]
    FallThrough,
    /// Stop at the first send failure and report it as `Failed`
    Surface,
}

#[derive(Error, Debug)]
#[error("unknown delivery failure policy '{0}'")]
pub struct ParsePolicyError(String);

impl FromStr for FailurePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallthrough" | "fall_through" | "fall-through" => Ok(Self::FallThrough),
            "surface" => Ok(Self::Surface),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FallThrough => write!(f, "fallthrough"),
            Self::Surface => write!(f, "surface"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!("Fall-Through".parse::<FailurePolicy>().unwrap(), FailurePolicy::FallThrough);
        assert_eq!("surface".parse::<FailurePolicy>().unwrap(), FailurePolicy::Surface);
        assert!("never".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(DeliveryOutcome::Delivered {
            provider: "resend".to_string(),
            message_id: "m1".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "delivered");
        assert_eq!(json["provider"], "resend");
    }
}
