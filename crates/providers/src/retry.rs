//! Backoff helpers for provider and delivery HTTP calls.
//!
//! Two rules, in order: a server-supplied `Retry-After` duration is
//! honored verbatim; otherwise the delay grows exponentially from
//! [`RetryConfig::initial_delay`] up to [`RetryConfig::max_delay`].
//! Attempts are bounded -- there is no indefinite retrying anywhere.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Total attempts (first try included).
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 3,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`RetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Extract a `Retry-After` duration from response headers.
///
/// Only the delta-seconds form is recognized; an HTTP-date value (or
/// garbage) yields `None` and the caller falls back to exponential
/// backoff.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let secs: u64 = value.trim().parse().ok()?;
    Some(Duration::from_secs(secs))
}
