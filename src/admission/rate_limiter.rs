//! Sliding-window rate limiter

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::store::{InMemoryWindowStore, WindowStore};

/// Admits at most `max_count` requests per key within any trailing window
pub struct RateLimiter<S: WindowStore = InMemoryWindowStore> {
    store: Arc<S>,
}

impl RateLimiter<InMemoryWindowStore> {
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryWindowStore::new()))
    }
}

impl<S: WindowStore> RateLimiter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check and record a request for `key` at the current instant
    pub fn allow(&self, key: &str, window: Duration, max_count: usize) -> bool {
        self.allow_at(key, window, max_count, Instant::now())
    }

    /// Check and record a request for `key` at `now`.
    ///
    /// Timestamps older than `window` are discarded first. A denied request
    /// is not recorded.
    pub fn allow_at(&self, key: &str, window: Duration, max_count: usize, now: Instant) -> bool {
        let allowed = self.store.update(key, |timestamps| {
            while let Some(oldest) = timestamps.front() {
                if now.saturating_duration_since(*oldest) >= window {
                    timestamps.pop_front();
                } else {
                    break;
                }
            }

            if timestamps.len() >= max_count {
                false
            } else {
                timestamps.push_back(now);
                true
            }
        });

        if !allowed {
            debug!(key, window_ms = window.as_millis() as u64, max_count, "Rate limit exceeded");
        }
        allowed
    }

    /// Drop keys with no request inside `window` as of `now`
    pub fn evict_idle(&self, window: Duration, now: Instant) -> usize {
        match now.checked_sub(window) {
            Some(cutoff) => self.store.evict_older_than(cutoff),
            None => 0,
        }
    }
}

impl<S: WindowStore> Clone for RateLimiter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
