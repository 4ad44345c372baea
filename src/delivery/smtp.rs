//! SMTP submission channel (provider B)

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use super::channel::{ChannelAttempt, DeliveryChannel};
use super::task::{DeliveryTask, MessageBody};
use crate::config::SmtpConfig;
use crate::error::ChannelError;

pub const SMTP_CHANNEL_ID: &str = "smtp";

enum SmtpState {
    Ready(AsyncSmtpTransport<Tokio1Executor>),
    Unavailable(&'static str),
}

pub struct SmtpChannel {
    state: SmtpState,
    from: String,
}

impl SmtpChannel {
    /// Build the channel. `disabled` is the operator override that skips this
    /// channel even when credentials exist.
    pub fn new(
        config: Option<&SmtpConfig>,
        from: impl Into<String>,
        disabled: bool,
    ) -> Result<Self, ChannelError> {
        let state = match (config, disabled) {
            (_, true) => SmtpState::Unavailable("disabled by RESEND_ONLY"),
            (None, false) => SmtpState::Unavailable("SMTP credentials not configured"),
            (Some(cfg), false) => {
                let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
                    .map_err(|e| ChannelError::Smtp(e.to_string()))?
                    .port(cfg.port)
                    .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
                    .timeout(Some(Duration::from_secs(20)))
                    .build();
                SmtpState::Ready(transport)
            }
        };

        Ok(Self {
            state,
            from: from.into(),
        })
    }

    fn build_message(&self, task: &DeliveryTask, message_id: &str) -> Result<Message, ChannelError> {
        let parse = |addr: &str| {
            addr.parse::<Mailbox>()
                .map_err(|e| ChannelError::Message(format!("invalid address '{}': {}", addr, e)))
        };

        let mut builder = Message::builder()
            .from(parse(&self.from)?)
            .to(parse(&task.to)?)
            .subject(task.subject.clone())
            .message_id(Some(message_id.to_string()));
        if let Some(reply_to) = &task.reply_to {
            builder = builder.reply_to(parse(reply_to)?);
        }

        let (content_type, body) = match &task.body {
            MessageBody::Html(s) => (ContentType::TEXT_HTML, s.clone()),
            MessageBody::Text(s) => (ContentType::TEXT_PLAIN, s.clone()),
        };

        builder
            .header(content_type)
            .body(body)
            .map_err(|e| ChannelError::Message(e.to_string()))
    }
}

/// Locally generated Message-ID, `<uuid@sender-domain>`
fn new_message_id(from: &str) -> String {
    let domain = from
        .rsplit_once('@')
        .map(|(_, d)| d.trim_end_matches('>'))
        .filter(|d| !d.is_empty())
        .unwrap_or("localhost");
    format!("<{}@{}>", Uuid::new_v4(), domain)
}

#[async_trait]
impl DeliveryChannel for SmtpChannel {
    fn id(&self) -> &str {
        SMTP_CHANNEL_ID
    }

    async fn attempt(&self, task: &DeliveryTask) -> ChannelAttempt {
        let transport = match &self.state {
            SmtpState::Ready(t) => t,
            SmtpState::Unavailable(reason) => {
                return ChannelAttempt::Unavailable {
                    reason: reason.to_string(),
                }
            }
        };

        let message_id = new_message_id(&self.from);
        let message = match self.build_message(task, &message_id) {
            Ok(m) => m,
            Err(e) => return ChannelAttempt::Failed(e),
        };

        match transport.send(message).await {
            Ok(_) => ChannelAttempt::Delivered { message_id },
            Err(e) => ChannelAttempt::Failed(ChannelError::Smtp(e.to_string())),
        }
    }
}
