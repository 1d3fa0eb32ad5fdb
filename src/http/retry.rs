//! Retry configuration and backoff delay calculation.
//!
//! [`RetryConfig`] decides *whether* a failed attempt is retried
//! (deterministic, from the error and the attempt index) and *how long* to
//! wait first (exponential backoff plus optional random jitter).

use std::time::Duration;

use rand::Rng;

use crate::LensError;

/// Default number of retries after the initial attempt.
pub const MAX_RETRIES: u32 = 3;

/// Default base backoff; attempt `n` waits `2^n * BASE_BACKOFF` plus jitter.
pub const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Configuration for retry behaviour on retryable failures.
///
/// ```rust
/// # use locallens::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_retries(5)
///     .base_backoff(Duration::from_millis(200))
///     .jitter(false);
/// assert_eq!(config.delay_for_attempt(2), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries allowed after the initial attempt. 0 = no retry. Default: 3.
    pub max_retries: u32,
    /// Base delay before the first retry. Default: 500ms.
    pub base_backoff: Duration,
    /// Whether to add random jitter in `[0, base_backoff / 2)`. Default: true.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_backoff: BASE_BACKOFF,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new config with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the number of retries after the initial attempt.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the base backoff delay.
    pub fn base_backoff(mut self, delay: Duration) -> Self {
        self.base_backoff = delay;
        self
    }

    /// Enable or disable jitter.
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Whether the failure of attempt `attempt` (0-indexed) is retried.
    pub fn should_retry(&self, error: &LensError, attempt: u32) -> bool {
        error.is_retryable() && attempt < self.max_retries
    }

    /// Backoff before the retry that follows attempt `attempt`, without jitter.
    ///
    /// `base_backoff * 2^attempt`, saturating instead of overflowing.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Exclusive upper bound of the jitter added to every delay.
    pub fn max_jitter(&self) -> Duration {
        if self.jitter {
            self.base_backoff / 2
        } else {
            Duration::ZERO
        }
    }

    /// Full delay for attempt `attempt`: backoff plus a random jitter.
    pub fn effective_delay(&self, attempt: u32) -> Duration {
        let base = self.delay_for_attempt(attempt);
        let bound = self.max_jitter();
        if bound.is_zero() {
            return base;
        }
        let jitter_nanos = rand::rng().random_range(0..bound.as_nanos() as u64);
        base.saturating_add(Duration::from_nanos(jitter_nanos))
    }
}
