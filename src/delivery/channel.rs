//! Delivery channel strategy

use async_trait::async_trait;

use super::task::DeliveryTask;
use crate::error::ChannelError;

/// Result of offering a task to one channel
#[derive(Debug)]
pub enum ChannelAttempt {
    Delivered { message_id: String },
    /// Channel not usable (missing credentials, disabled); nothing was sent
    Unavailable { reason: String },
    /// Channel tried to send and failed
    Failed(ChannelError),
}

/// One interchangeable outbound mail provider
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Stable provider identifier reported in outcomes
    fn id(&self) -> &str;

    async fn attempt(&self, task: &DeliveryTask) -> ChannelAttempt;
}
