//! Notification delivery
//!
//! Each Delivery Task goes out through exactly one channel, tried in fixed
//! priority order:
//! 1. Transactional-email API (`ResendChannel`)
//! 2. SMTP submission (`SmtpChannel`), unless disabled by `RESEND_ONLY`
//!
//! When no channel delivers, the task is logged as simulated. Delivery is
//! best-effort and never fails the caller; batches are dispatched as detached
//! background tasks.

pub mod channel;
pub mod dispatch;
pub mod notifications;
pub mod orchestrator;
pub mod resend;
pub mod smtp;
pub mod task;

pub use channel::{ChannelAttempt, DeliveryChannel};
pub use dispatch::{spawn_batch, BatchReport};
pub use notifications::MailTemplates;
pub use orchestrator::DeliveryOrchestrator;
pub use resend::ResendChannel;
pub use smtp::SmtpChannel;
pub use task::{DeliveryOutcome, DeliveryTask, FailurePolicy, MessageBody};
