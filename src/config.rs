//! Environment-driven configuration
//!
//! All settings come from process environment variables (the server binary
//! loads a `.env` file first). Missing credentials are not errors: the
//! component that needs them reports itself as unconfigured at call time.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::delivery::FailurePolicy;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_MAIL_FROM: &str = "no-reply@enzenem.hu";
const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 45_000;
const DEFAULT_GENERATION_MAX_ATTEMPTS: u32 = 6;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_500;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_CHECKOUT_WINDOW_MS: u64 = 10_000;
const DEFAULT_CHECKOUT_MAX: usize = 5;

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub public_url: Option<String>,
    pub composer: ComposerConfig,
    pub generation: GenerationConfig,
    pub delivery: DeliveryConfig,
    pub checkout: CheckoutConfig,
    pub order_log: OrderLogConfig,
}

/// Lyric composer (chat completions) settings
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub api_key: Option<String>,
    pub model: String,
}

/// Music generation provider settings
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Hard deadline for the two-track generation call
    pub timeout: Duration,
    pub max_attempts: u32,
    /// Backoff unit: the delay before attempt n+1 is `backoff_base * n`
    pub backoff_base: Duration,
}

/// Notification delivery settings
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Provider A credential (transactional-email API)
    pub resend_api_key: Option<String>,
    /// Provider B (SMTP submission)
    pub smtp: Option<SmtpConfig>,
    /// Operator override: never use provider B
    pub resend_only: bool,
    pub mail_from: String,
    /// Staff notification address
    pub notify_to: Option<String>,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Checkout collaborator and its admission control
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub secret_key: Option<String>,
    pub price_id: Option<String>,
    pub rate_window: Duration,
    pub rate_max: usize,
}

#[derive(Debug, Clone)]
pub struct OrderLogConfig {
    pub sheet_id: Option<String>,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;

        let generation = GenerationConfig {
            api_key: get("SUNO_API_KEY"),
            base_url: strip_trailing_slashes(get("SUNO_BASE_URL").unwrap_or_default()),
            timeout: Duration::from_millis(parse_or(
                get("SUNO_TIMEOUT_MS"),
                "SUNO_TIMEOUT_MS",
                DEFAULT_GENERATION_TIMEOUT_MS,
            )?),
            max_attempts: parse_or(
                get("SUNO_MAX_ATTEMPTS"),
                "SUNO_MAX_ATTEMPTS",
                DEFAULT_GENERATION_MAX_ATTEMPTS,
            )?
            .max(1),
            backoff_base: Duration::from_millis(parse_or(
                get("SUNO_BACKOFF_BASE_MS"),
                "SUNO_BACKOFF_BASE_MS",
                DEFAULT_BACKOFF_BASE_MS,
            )?),
        };
        if !generation.base_url.is_empty() {
            url::Url::parse(&generation.base_url).context("SUNO_BASE_URL is not a valid URL")?;
        }

        let smtp = match (get("SMTP_HOST"), get("SMTP_USER"), get("SMTP_PASS")) {
            (Some(host), Some(username), Some(password)) => Some(SmtpConfig {
                host,
                port: parse_or(get("SMTP_PORT"), "SMTP_PORT", DEFAULT_SMTP_PORT)?,
                username,
                password,
            }),
            _ => None,
        };

        let failure_policy = match get("DELIVERY_FAILURE_POLICY") {
            Some(v) => v
                .parse::<FailurePolicy>()
                .context("DELIVERY_FAILURE_POLICY must be 'fallthrough' or 'surface'")?,
            None => FailurePolicy::default(),
        };

        let delivery = DeliveryConfig {
            resend_api_key: get("RESEND_API_KEY"),
            smtp,
            resend_only: parse_flag(get("RESEND_ONLY")),
            mail_from: get("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            notify_to: get("NOTIFY_TO"),
            failure_policy,
        };

        let checkout = CheckoutConfig {
            secret_key: get("CHECKOUT_SECRET_KEY"),
            price_id: get("CHECKOUT_PRICE_ID"),
            rate_window: Duration::from_millis(parse_or(
                get("CHECKOUT_RATE_WINDOW_MS"),
                "CHECKOUT_RATE_WINDOW_MS",
                DEFAULT_CHECKOUT_WINDOW_MS,
            )?),
            rate_max: parse_or(
                get("CHECKOUT_RATE_MAX"),
                "CHECKOUT_RATE_MAX",
                DEFAULT_CHECKOUT_MAX,
            )?,
        };

        Ok(Self {
            port,
            public_url: get("PUBLIC_URL").map(strip_trailing_slashes),
            composer: ComposerConfig {
                api_key: get("OPENAI_API_KEY"),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            },
            generation,
            delivery,
            checkout,
            order_log: OrderLogConfig {
                sheet_id: get("SHEETS_ID"),
            },
        })
    }

    /// Provider callback URL, when a public URL is known
    pub fn generation_callback_url(&self) -> Option<String> {
        self.public_url
            .as_ref()
            .map(|base| format!("{}/api/suno/callback", base))
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("{} has invalid value '{}'", key, v)),
        None => Ok(default),
    }
}

fn parse_flag(value: Option<String>) -> bool {
    matches!(
        value.map(|v| v.to_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

fn strip_trailing_slashes(s: String) -> String {
    s.trim_end_matches('/').to_string()
}
