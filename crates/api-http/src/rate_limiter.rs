//! Rate Limiter (Token Bucket)
//!
//! Shields the billable generate endpoint from bursts. One bucket per
//! process behind a Mutex - contention is negligible at the request rates
//! an image pipeline can sustain anyway.

use std::sync::Mutex;
use std::time::Instant;

/// Token bucket limiter.
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    max_tokens: f64,
    refill_per_sec: f64,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// # Arguments
    /// * `max_burst` - Maximum burst size
    /// * `refill_per_sec` - Tokens added per second
    pub fn new(max_burst: u32, refill_per_sec: u32) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: max_burst as f64,
                last_refill: Instant::now(),
            }),
            max_tokens: max_burst as f64,
            refill_per_sec: refill_per_sec as f64,
        }
    }

    /// Check if a request is allowed (consumes 1 token).
    pub fn check(&self) -> bool {
        let mut bucket = self.bucket.lock().unwrap();

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.max_tokens);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
