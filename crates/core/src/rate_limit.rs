//! Rate limiting for outbound API calls
//!
//! Public geocoders publish strict usage policies (Nominatim allows one
//! request per second per application). The limiter keeps one token bucket
//! per key, normally the target host, and can either reject or tell the
//! caller how long to wait for the next slot.
//!
//! # Example
//!
//! ```rust
//! use nextfinish_core::rate_limit::{RateLimiter, RateLimitConfig};
//!
//! let limiter = RateLimiter::new(RateLimitConfig::per_second(1));
//!
//! match limiter.reserve("nominatim.openstreetmap.org") {
//!     None => { /* slot taken, call now */ }
//!     Some(wait) => { /* sleep for `wait`, then reserve again */ let _ = wait; }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rate limiter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// Extra requests allowed in a short burst
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_second(1)
    }
}

impl RateLimitConfig {
    /// Strict limit with no burst allowance
    #[must_use]
    pub fn strict(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            burst: 0,
        }
    }

    /// Per-second limit without burst, matching public geocoder policies
    #[must_use]
    pub fn per_second(max: u32) -> Self {
        Self::strict(max, Duration::from_secs(1))
    }

    /// Per-minute limit with a quarter of the budget as burst
    #[must_use]
    pub fn per_minute(max: u32) -> Self {
        Self {
            max_requests: max,
            window: Duration::from_secs(60),
            burst: max / 4,
        }
    }

    fn capacity(&self) -> f64 {
        f64::from(self.max_requests + self.burst)
    }

    fn refill_per_sec(&self) -> f64 {
        f64::from(self.max_requests) / self.window.as_secs_f64()
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refreshed: Instant,
}

impl Bucket {
    fn full(config: &RateLimitConfig) -> Self {
        Self {
            tokens: config.capacity(),
            refreshed: Instant::now(),
        }
    }

    fn refill(&mut self, config: &RateLimitConfig) {
        let now = Instant::now();
        let gained = now.duration_since(self.refreshed).as_secs_f64() * config.refill_per_sec();
        self.tokens = (self.tokens + gained).min(config.capacity());
        self.refreshed = now;
    }

    fn wait_for_one(&self, config: &RateLimitConfig) -> Duration {
        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64((1.0 - self.tokens) / config.refill_per_sec())
    }
}

/// Token-bucket rate limiter keyed by an arbitrary string
#[derive(Debug)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// The configuration every bucket is created with
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn with_bucket<T>(&self, key: &str, f: impl FnOnce(&mut Bucket, &RateLimitConfig) -> T) -> T {
        // A poisoned lock only means another caller panicked mid-update; the counts are still usable
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket::full(&self.config));
        bucket.refill(&self.config);
        f(bucket, &self.config)
    }

    /// Take a token if one is available
    #[must_use]
    pub fn try_acquire(&self, key: &str) -> bool {
        self.reserve(key).is_none()
    }

    /// Take a token, or report how long until one becomes available.
    ///
    /// Returns `None` when the token was taken.
    #[must_use]
    pub fn reserve(&self, key: &str) -> Option<Duration> {
        self.with_bucket(key, |bucket, config| {
            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                None
            } else {
                Some(bucket.wait_for_one(config))
            }
        })
    }

    /// Whole tokens currently available for a key
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn available(&self, key: &str) -> u32 {
        self.with_bucket(key, |bucket, _| bucket.tokens.floor() as u32)
    }

    /// Snapshot of a key's bucket
    #[must_use]
    pub fn status(&self, key: &str) -> RateLimitStatus {
        self.with_bucket(key, |bucket, config| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let available = bucket.tokens.floor() as u32;
            RateLimitStatus {
                available,
                max: config.max_requests + config.burst,
                next_slot_in: bucket.wait_for_one(config),
            }
        })
    }

    /// Forget the bucket for a key
    pub fn reset(&self, key: &str) {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        buckets.remove(key);
    }
}

/// Rate limit status
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    /// Available tokens
    pub available: u32,
    /// Maximum tokens
    pub max: u32,
    /// Time until the next token
    pub next_slot_in: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_second_allows_one_then_waits() {
        let limiter = RateLimiter::new(RateLimitConfig::per_second(1));

        assert!(limiter.reserve("nominatim").is_none());
        let wait = limiter.reserve("nominatim").expect("second call must wait");
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(1));
    }

    #[test]
    fn test_burst_extends_capacity() {
        let config = RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
            burst: 2,
        };
        let limiter = RateLimiter::new(config);

        for _ in 0..4 {
            assert!(limiter.try_acquire("test"));
        }
        assert!(!limiter.try_acquire("test"));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(RateLimitConfig::strict(1, Duration::from_secs(60)));

        assert!(limiter.try_acquire("host-a"));
        assert!(!limiter.try_acquire("host-a"));
        assert!(limiter.try_acquire("host-b"));
    }

    #[test]
    fn test_reset_restores_capacity() {
        let limiter = RateLimiter::new(RateLimitConfig::strict(1, Duration::from_secs(60)));

        assert!(limiter.try_acquire("test"));
        assert!(!limiter.try_acquire("test"));

        limiter.reset("test");
        assert!(limiter.try_acquire("test"));
    }

    #[test]
    fn test_status() {
        let config = RateLimitConfig {
            max_requests: 10,
            window: Duration::from_secs(60),
            burst: 5,
        };
        let limiter = RateLimiter::new(config);

        let status = limiter.status("test");
        assert_eq!(status.max, 15);
        assert_eq!(status.available, 15);
        assert_eq!(status.next_slot_in, Duration::ZERO);
    }
}
