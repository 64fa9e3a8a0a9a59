//! Per-key fixed-window token bucket.
//!
//! Each key gets `max` tokens that are restored in full once `window` has
//! elapsed since the last reset. There is no gradual refill.
//!
//! Buckets are created lazily and never evicted: the key set grows with the
//! number of distinct callers over the process lifetime. `len()` is exported
//! as a metric so long-lived deployments can watch it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use stationflow_core::clock::Clock;

/// Fixed-window bucket for one key.
#[derive(Debug, Clone)]
pub(crate) struct TokenBucket {
    max: u32,
    tokens: u32,
    window_start: DateTime<Utc>,
}

impl TokenBucket {
    pub fn new(max: u32, now: DateTime<Utc>) -> Self {
        Self {
            max,
            tokens: max,
            window_start: now,
        }
    }

    pub fn try_take(&mut self, now: DateTime<Utc>, window: Duration) -> bool {
        self.refill(now, window);

        if self.tokens == 0 {
            return false;
        }
        self.tokens -= 1;
        true
    }

    fn refill(&mut self, now: DateTime<Utc>, window: Duration) {
        // A clock that moved backwards counts as no time elapsed.
        let elapsed = (now - self.window_start).to_std().unwrap_or(Duration::ZERO);
        if elapsed > window {
            self.tokens = self.max;
            self.window_start = now;
        }
    }
}

/// Shared limiter keyed by caller identity (user id or IP, per call site).
pub struct RateLimiter {
    max: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    buckets: DashMap<String, Mutex<TokenBucket>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max: max.max(1),
            window,
            clock,
            buckets: DashMap::new(),
        }
    }

    /// Consume one token for `key`. Returns false when the bucket is empty.
    pub fn allow(&self, key: &str) -> bool {
        let now = self.clock.now().with_timezone(&Utc);

        if let Some(bucket) = self.buckets.get(key) {
            return take(&bucket, now, self.window);
        }

        let bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Mutex::new(TokenBucket::new(self.max, now)))
            .downgrade();
        take(&bucket, now, self.window)
    }

    /// Number of keys tracked so far.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn take(bucket: &Mutex<TokenBucket>, now: DateTime<Utc>, window: Duration) -> bool {
    // Poisoned mutex means a logic bug; deny rather than panic.
    match bucket.lock() {
        Ok(mut b) => b.try_take(now, window),
        Err(_) => false,
    }
}
