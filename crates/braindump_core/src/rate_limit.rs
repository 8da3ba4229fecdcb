//! Fixed-window admission control for classifier calls.
//!
//! # Responsibility
//! - Count admissions per 60-second bucket and reject past the ceiling.
//!
//! # Invariants
//! - Only the current bucket survives an admission; older buckets are evicted.
//! - Counter updates are serialized by an internal mutex.
//! - Bursts across a window boundary are accepted (fixed window, not sliding).

use chrono::{DateTime, Utc};
use log::warn;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Default admissions per window.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 20;
const WINDOW_SECS: i64 = 60;

/// Process-wide request budget, shared by reference between callers.
#[derive(Debug)]
pub struct RateLimiter {
    ceiling: u32,
    buckets: Mutex<HashMap<i64, u32>>,
}

impl RateLimiter {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Attempts one admission at the current wall-clock time.
    pub fn admit(&self) -> bool {
        self.admit_at(Utc::now())
    }

    /// Attempts one admission at `now`.
    ///
    /// Returns `false` without recording anything when the bucket for `now`
    /// is already at the ceiling.
    pub fn admit_at(&self, now: DateTime<Utc>) -> bool {
        let bucket = bucket_of(now);
        let mut buckets = self.buckets.lock();
        let count = buckets.get(&bucket).copied().unwrap_or(0);

        if count >= self.ceiling {
            warn!(
                "event=rate_limit module=rate_limit status=rejected bucket={} count={} ceiling={}",
                bucket, count, self.ceiling
            );
            return false;
        }

        buckets.insert(bucket, count + 1);
        buckets.retain(|key, _| *key >= bucket);
        true
    }

    /// Admissions left in the bucket containing `now`.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u32 {
        let used = self
            .buckets
            .lock()
            .get(&bucket_of(now))
            .copied()
            .unwrap_or(0);
        self.ceiling.saturating_sub(used)
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    #[cfg(test)]
    fn live_buckets(&self) -> usize {
        self.buckets.lock().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

fn bucket_of(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(WINDOW_SECS)
}
