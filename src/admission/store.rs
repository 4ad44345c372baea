//! Window stores: key -> timestamps of admitted requests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;

/// Per-key timestamp storage.
///
/// `update` must run the closure with exclusive access to the key's window,
/// so a read-filter-append cycle for one key is never interleaved with
/// another for the same key.
pub trait WindowStore: Send + Sync {
    fn update<R>(&self, key: &str, f: impl FnOnce(&mut VecDeque<Instant>) -> R) -> R;

    /// Drop keys whose newest timestamp is older than `cutoff`. Returns the
    /// number of keys removed.
    fn evict_older_than(&self, cutoff: Instant) -> usize;

    fn key_count(&self) -> usize;
}

/// Process-local store behind a single mutex
#[derive(Debug, Default)]
pub struct InMemoryWindowStore {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowStore for InMemoryWindowStore {
    fn update<R>(&self, key: &str, f: impl FnOnce(&mut VecDeque<Instant>) -> R) -> R {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let window = windows.entry(key.to_string()).or_default();
        f(window)
    }

    fn evict_older_than(&self, cutoff: Instant) -> usize {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = windows.len();
        windows.retain(|_, w| w.back().is_some_and(|newest| *newest >= cutoff));
        before - windows.len()
    }

    fn key_count(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
