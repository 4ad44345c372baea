//! Hosted checkout collaborator
//!
//! Creates a payment session with the payment provider and hands back the
//! redirect URL. Admission control happens in the HTTP layer before this is
//! reached.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::CheckoutConfig;
use crate::error::CheckoutError;

const SESSIONS_ENDPOINT: &str = "https://api.stripe.com/v1/checkout/sessions";

/// Customer-facing details of a checkout request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[async_trait]
pub trait CheckoutSessions: Send + Sync {
    /// Create a session and return the hosted page URL
    async fn create_session(
        &self,
        request: &CheckoutRequest,
        return_base: &str,
    ) -> Result<String, CheckoutError>;
}

pub struct HostedCheckout {
    client: Client,
    secret_key: Option<String>,
    price_id: Option<String>,
    endpoint: String,
}

impl HostedCheckout {
    pub fn new(config: &CheckoutConfig) -> Result<Self, CheckoutError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            price_id: config.price_id.clone(),
            endpoint: SESSIONS_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[async_trait]
impl CheckoutSessions for HostedCheckout {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
        return_base: &str,
    ) -> Result<String, CheckoutError> {
        let (Some(secret), Some(price)) = (&self.secret_key, &self.price_id) else {
            return Err(CheckoutError::NotConfigured);
        };

        let form = session_form(price, request, return_base);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(secret)
            .form(&form)
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;
        let url = session.url.ok_or(CheckoutError::MissingUrl)?;

        info!(session_id = ?session.id, "Checkout session created");
        Ok(url)
    }
}

fn session_form(
    price: &str,
    request: &CheckoutRequest,
    return_base: &str,
) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("mode", "payment".to_string()),
        ("line_items[0][price]", price.to_string()),
        (
            "line_items[0][quantity]",
            request.quantity.unwrap_or(1).max(1).to_string(),
        ),
        ("success_url", format!("{}/?paid=1", return_base)),
        ("cancel_url", format!("{}/?canceled=1", return_base)),
    ];
    if let Some(email) = request.email.as_deref().filter(|e| !e.is_empty()) {
        form.push(("customer_email", email.to_string()));
    }
    form
}
