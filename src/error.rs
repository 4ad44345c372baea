//! Error types for the order pipeline
//!
//! Generation failures keep the transient / permanent / timeout distinction
//! visible to callers. Delivery channel errors never reach request handlers:
//! the orchestrator turns them into outcomes.

use std::time::Duration;

use thiserror::Error;

/// Failure of an outbound call to the music generation provider
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The provider did not answer within the hard deadline
    #[error("generation provider timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Non-retryable status (client error, auth failure, server error other
    /// than an overload signal)
    #[error("generation provider rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Every attempt answered with an overload status
    #[error("generation provider unavailable after {attempts} attempts (last status {last_status})")]
    Exhausted { attempts: u32, last_status: u16 },

    /// The provider answered but returned no downloadable track
    #[error("generation provider returned no track links")]
    NoTracks,

    /// Request never produced an HTTP status (connect, DNS, TLS, body read)
    #[error("generation transport error: {0}")]
    Transport(String),

    /// Successful status with a body that lacks a required field
    #[error("generation provider response invalid: {0}")]
    InvalidResponse(String),

    #[error("generation provider not configured: {0}")]
    NotConfigured(&'static str),
}

impl GenerationError {
    /// True when the provider never became available (as opposed to
    /// rejecting the request outright).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Exhausted { .. } | Self::Timeout(_))
    }
}

/// Failure of a single delivery channel attempt
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("message build failed: {0}")]
    Message(String),

    #[error("smtp error: {0}")]
    Smtp(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        ChannelError::Transport(e.to_string())
    }
}

/// Failure of the lyric composer collaborator
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("composer request failed: {0}")]
    Transport(String),

    #[error("composer returned status {0}")]
    Status(u16),

    #[error("composer returned empty lyrics")]
    Empty,
}

/// Failure of the checkout collaborator
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("checkout not configured")]
    NotConfigured,

    #[error("checkout request failed: {0}")]
    Transport(String),

    #[error("checkout provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("checkout response missing redirect url")]
    MissingUrl,
}

/// Mail template registration or rendering failure
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("mail template invalid: {0}")]
    Template(String),

    #[error("mail template render failed: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(GenerationError::Timeout(Duration::from_secs(45)).is_unavailable());
        assert!(GenerationError::Exhausted {
            attempts: 6,
            last_status: 503
        }
        .is_unavailable());
        assert!(!GenerationError::Rejected {
            status: 400,
            body: String::new()
        }
        .is_unavailable());
        assert!(!GenerationError::NoTracks.is_unavailable());
    }

    #[test]
    fn test_timeout_message_in_millis() {
        let e = GenerationError::Timeout(Duration::from_millis(45_000));
        assert_eq!(e.to_string(), "generation provider timed out after 45000ms");
    }
}
