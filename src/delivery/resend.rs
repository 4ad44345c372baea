//! Transactional-email API channel (provider A)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::channel::{ChannelAttempt, DeliveryChannel};
use super::task::{DeliveryTask, MessageBody};
use crate::error::ChannelError;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
pub const RESEND_CHANNEL_ID: &str = "resend";

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    #[serde(default)]
    id: Option<String>,
}

pub struct ResendChannel {
    http: Client,
    api_key: Option<String>,
    from: String,
    endpoint: String,
}

impl ResendChannel {
    pub fn new(api_key: Option<String>, from: impl Into<String>) -> Result<Self, ChannelError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            http,
            api_key,
            from: from.into(),
            endpoint: RESEND_API_URL.to_string(),
        })
    }

    /// Point the channel at a different API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn send(&self, api_key: &str, task: &DeliveryTask) -> Result<String, ChannelError> {
        let (html, text) = match &task.body {
            MessageBody::Html(s) => (Some(s.as_str()), None),
            MessageBody::Text(s) => (None, Some(s.as_str())),
        };
        let request = SendEmailRequest {
            from: &self.from,
            to: vec![task.to.as_str()],
            subject: &task.subject,
            html,
            text,
            reply_to: task.reply_to.as_deref(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: SendEmailResponse = response.json().await.unwrap_or(SendEmailResponse { id: None });
        Ok(parsed.id.unwrap_or_else(|| "unknown".to_string()))
    }
}

#[async_trait]
impl DeliveryChannel for ResendChannel {
    fn id(&self) -> &str {
        RESEND_CHANNEL_ID
    }

    async fn attempt(&self, task: &DeliveryTask) -> ChannelAttempt {
        let Some(api_key) = self.api_key.as_deref() else {
            return ChannelAttempt::Unavailable {
                reason: "RESEND_API_KEY not configured".to_string(),
            };
        };

        match self.send(api_key, task).await {
            Ok(message_id) => ChannelAttempt::Delivered { message_id },
            Err(e) => ChannelAttempt::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_is_unavailable() {
        let channel = ResendChannel::new(None, "no-reply@enzenem.hu").unwrap();
        let attempt = channel
            .attempt(&DeliveryTask::text("vevo@example.hu", "Teszt", "szia"))
            .await;
        assert!(matches!(attempt, ChannelAttempt::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_failure() {
        let channel = ResendChannel::new(Some("key".to_string()), "no-reply@enzenem.hu")
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/emails");
        let attempt = channel
            .attempt(&DeliveryTask::text("vevo@example.hu", "Teszt", "szia"))
            .await;
        assert!(matches!(attempt, ChannelAttempt::Failed(ChannelError::Transport(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let task = DeliveryTask::html("vevo@example.hu", "Tárgy", "<p>szia</p>")
            .with_reply_to("staff@enzenem.hu");
        let req = SendEmailRequest {
            from: "no-reply@enzenem.hu",
            to: vec![task.to.as_str()],
            subject: &task.subject,
            html: Some("<p>szia</p>"),
            text: None,
            reply_to: task.reply_to.as_deref(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["to"][0], "vevo@example.hu");
        assert_eq!(json["reply_to"], "staff@enzenem.hu");
        assert!(json.get("text").is_none());
    }
}
