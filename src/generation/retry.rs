//! Bounded retry and hard timeout for upstream calls
//!
//! Only overload signals are retried: 502 Bad Gateway, 503 Service
//! Unavailable and 429 Too Many Requests. Any other failure is final on the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::transport::UpstreamTransport;
use crate::error::GenerationError;

/// Retry ceiling and backoff unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            backoff_base: Duration::from_millis(1_500),
        }
    }
}

impl RetryPolicy {
    /// Delay slept after failed attempt `attempt` (1-based) before the next one
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt)
    }
}

/// Accepted start request
#[derive(Debug, Clone, PartialEq)]
pub struct StartResult {
    /// Parsed response body; an empty object when the body was not JSON
    pub data: Value,
    /// Attempts used, including the successful one
    pub attempts: u32,
}

pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503)
}

/// POST `body` to `url`, retrying on overload statuses.
///
/// Returns `Rejected` on the first non-transient failure status and
/// `Exhausted` once every attempt answered with an overload status.
/// Transport errors are not retried.
pub async fn start_with_retry(
    transport: &dyn UpstreamTransport,
    policy: &RetryPolicy,
    url: &str,
    headers: &[(String, String)],
    body: &Value,
) -> Result<StartResult, GenerationError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_status = 0;

    for attempt in 1..=max_attempts {
        let response = transport.post_json(url, headers, body).await?;

        if response.is_success() {
            let data = serde_json::from_str(&response.body).unwrap_or_else(|e| {
                debug!(error = %e, "Upstream accepted request with non-JSON body");
                Value::Object(Default::default())
            });
            return Ok(StartResult {
                data,
                attempts: attempt,
            });
        }

        if !is_transient_status(response.status) {
            warn!(
                status = response.status,
                attempt, "Upstream rejected request, not retrying"
            );
            return Err(GenerationError::Rejected {
                status: response.status,
                body: response.body.chars().take(500).collect(),
            });
        }

        last_status = response.status;
        if attempt < max_attempts {
            let delay = policy.delay_after(attempt);
            warn!(
                status = response.status,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Upstream overloaded, backing off"
            );
            sleep(delay).await;
        }
    }

    warn!(
        attempts = max_attempts,
        last_status, "Upstream never became available"
    );
    Err(GenerationError::Exhausted {
        attempts: max_attempts,
        last_status,
    })
}

/// Race `fut` against a timer. On expiry the future is dropped, so a late
/// response can never affect the result.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, GenerationError>
where
    F: Future<Output = Result<T, GenerationError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_ms = limit.as_millis() as u64, "Upstream call timed out");
            Err(GenerationError::Timeout(limit))
        }
    }
}
