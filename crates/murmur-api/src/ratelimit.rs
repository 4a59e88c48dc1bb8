//! In-memory per-IP rate limiting.
//!
//! A TTL cache holds one counter per client key; the window resets when
//! the entry expires. Per-process only: restarts clear it, and multiple
//! instances do not coordinate.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use moka::sync::Cache;

pub struct RateLimiter {
    hits: Cache<String, Arc<AtomicU32>>,
    max_per_window: u32,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        let hits = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(window)
            .build();
        Self {
            hits,
            max_per_window,
        }
    }

    /// Record a hit for `key` and report whether it is still within the
    /// window budget.
    pub fn check(&self, key: &str) -> bool {
        let counter = self
            .hits
            .get_with(key.to_string(), || Arc::new(AtomicU32::new(0)));
        counter.fetch_add(1, Ordering::Relaxed) < self.max_per_window
    }
}
