//! Ordered channel fallback for a single Delivery Task

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::channel::{ChannelAttempt, DeliveryChannel};
use super::resend::ResendChannel;
use super::smtp::SmtpChannel;
use super::task::{DeliveryOutcome, DeliveryTask, FailurePolicy};
use crate::config::DeliveryConfig;
use crate::error::ChannelError;

/// Tries channels in priority order and stops at the first real outcome
pub struct DeliveryOrchestrator {
    channels: Vec<Arc<dyn DeliveryChannel>>,
    policy: FailurePolicy,
}

impl DeliveryOrchestrator {
    pub fn new(channels: Vec<Arc<dyn DeliveryChannel>>, policy: FailurePolicy) -> Self {
        Self { channels, policy }
    }

    /// Provider A (transactional API), then provider B (SMTP)
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, ChannelError> {
        let resend = ResendChannel::new(config.resend_api_key.clone(), config.mail_from.clone())?;
        let smtp = SmtpChannel::new(
            config.smtp.as_ref(),
            config.mail_from.clone(),
            config.resend_only,
        )?;

        Ok(Self::new(
            vec![Arc::new(resend), Arc::new(smtp)],
            config.failure_policy,
        ))
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Deliver one task. Never returns an error: every failure ends as an
    /// outcome.
    pub async fn deliver(&self, task: &DeliveryTask) -> DeliveryOutcome {
        if task.to.trim().is_empty() {
            debug!(subject = %task.subject, "Skipping delivery without recipient");
            return DeliveryOutcome::Skipped {
                reason: "missing recipient".to_string(),
            };
        }

        for channel in &self.channels {
            match channel.attempt(task).await {
                ChannelAttempt::Delivered { message_id } => {
                    info!(
                        provider = channel.id(),
                        message_id = %message_id,
                        to = %task.to,
                        subject = %task.subject,
                        "Delivered notification"
                    );
                    return DeliveryOutcome::Delivered {
                        provider: channel.id().to_string(),
                        message_id,
                    };
                }
                ChannelAttempt::Unavailable { reason } => {
                    debug!(provider = channel.id(), reason = %reason, "Channel unavailable");
                }
                ChannelAttempt::Failed(e) => match self.policy {
                    FailurePolicy::FallThrough => {
                        warn!(
                            provider = channel.id(),
                            error = %e,
                            "Channel send failed, falling through"
                        );
                    }
                    FailurePolicy::Surface => {
                        error!(
                            provider = channel.id(),
                            error = %e,
                            to = %task.to,
                            subject = %task.subject,
                            "Channel send failed"
                        );
                        return DeliveryOutcome::Failed {
                            provider: channel.id().to_string(),
                            error: e.to_string(),
                        };
                    }
                },
            }
        }

        info!(
            to = %task.to,
            subject = %task.subject,
            "No delivery channel available, notification simulated"
        );
        DeliveryOutcome::Simulated
    }
}
