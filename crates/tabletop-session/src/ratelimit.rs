//! Token-bucket rate limiting for inbound messages.
//!
//! Each connection owns one [`RateLimiter`]. The bucket starts full
//! (`capacity` tokens), refills continuously at `refill_per_sec` tokens per
//! second up to `capacity`, and every inbound message costs one token.
//! With the defaults a client can burst 15 messages and then sustain 7 per
//! second.
//!
//! Time comes from [`tokio::time::Instant`], so tests can pause the clock
//! and advance it by hand.

use tokio::time::Instant;

/// Bucket sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Maximum burst, in messages.
    pub capacity: f64,
    /// Sustained rate, in messages per second.
    pub refill_per_sec: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 15.0,
            refill_per_sec: 7.0,
        }
    }
}

/// The outcome of asking the limiter for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// A single connection's token bucket.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    tokens: f64,
    last: Instant,
}

impl RateLimiter {
    /// A full bucket.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            tokens: config.capacity,
            last: Instant::now(),
        }
    }

    /// Refills for the time elapsed since the last call, then tries to
    /// spend one token.
    pub fn try_acquire(&mut self) -> Decision {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.tokens =
            (self.tokens + elapsed * self.config.refill_per_sec).min(self.config.capacity);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Tokens currently available, without refilling.
    pub fn available(&self) -> f64 {
        self.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
