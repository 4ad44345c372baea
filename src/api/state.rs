//! Shared handler state

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::admission::RateLimiter;
use crate::checkout::{CheckoutSessions, HostedCheckout};
use crate::config::AppConfig;
use crate::delivery::{spawn_batch, DeliveryOrchestrator, DeliveryTask, MailTemplates};
use crate::generation::{GenerationClient, HttpTransport};
use crate::lyrics::{LyricsComposer, OpenAiComposer};
use crate::order_log::{OrderSink, TracingOrderSink};

/// Collaborators and settings for the request handlers
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<dyn LyricsComposer>,
    pub generation: Arc<GenerationClient>,
    pub delivery: Arc<DeliveryOrchestrator>,
    pub mail: Arc<MailTemplates>,
    pub order_log: Arc<dyn OrderSink>,
    pub checkout: Arc<dyn CheckoutSessions>,
    pub rate_limiter: RateLimiter,
    /// Staff address for order and contact notices
    pub notify_to: Option<String>,
    /// Provider callback for asynchronous generation jobs
    pub callback_url: Option<String>,
    /// Base URL the payment page returns to
    pub return_base: String,
    pub checkout_window: Duration,
    pub checkout_max: usize,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = HttpTransport::new().context("Failed to build generation transport")?;
        let generation = GenerationClient::new(Arc::new(transport), config.generation.clone());
        let composer =
            OpenAiComposer::new(&config.composer).context("Failed to build lyric composer")?;
        let delivery = DeliveryOrchestrator::from_config(&config.delivery)
            .context("Failed to build delivery channels")?;
        let mail = MailTemplates::new().context("Failed to register mail templates")?;
        let checkout =
            HostedCheckout::new(&config.checkout).context("Failed to build checkout client")?;

        Ok(Self {
            composer: Arc::new(composer),
            generation: Arc::new(generation),
            delivery: Arc::new(delivery),
            mail: Arc::new(mail),
            order_log: Arc::new(TracingOrderSink::new(config.order_log.sheet_id.clone())),
            checkout: Arc::new(checkout),
            rate_limiter: RateLimiter::in_memory(),
            notify_to: config.delivery.notify_to.clone(),
            callback_url: config.generation_callback_url(),
            return_base: config
                .public_url
                .clone()
                .unwrap_or_else(|| format!("http://localhost:{}", config.port)),
            checkout_window: config.checkout.rate_window,
            checkout_max: config.checkout.rate_max,
        })
    }

    /// Hand tasks to the background dispatcher and return at once
    pub fn dispatch(&self, tasks: Vec<DeliveryTask>) {
        if tasks.is_empty() {
            return;
        }
        drop(spawn_batch(Arc::clone(&self.delivery), tasks));
    }
}
