//! Retry With Backoff
//!
//! Re-runs an upstream operation with exponential backoff while its failures
//! are classified as retryable.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ContentError, Result};

// == Retry Policy ==
/// How often and how patiently an operation is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `max_retries + 1`
    pub max_retries: u32,
    /// Wait before the first retry, doubled for every later one
    pub base_delay: Duration,
    /// Upper bound for any single wait, including a server supplied one
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    /// Single attempt, no waiting.
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Backoff before retry number `attempt` (0-based): `base_delay * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Actual wait after a failed attempt. A `Retry-After` hint can only
    /// lengthen the wait, and the result never exceeds `max_delay`.
    pub fn delay_for(&self, attempt: u32, error: &ContentError) -> Duration {
        let backoff = self.backoff(attempt);
        match error.retry_after() {
            Some(hint) => backoff.max(hint).min(self.max_delay),
            None => backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

// == Retry Loop ==
/// Runs `operation` up to `policy.max_retries + 1` times.
///
/// Stops at the first success, at the first non-retryable error, or after
/// the last attempt, returning the last error in the failure cases.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("Upstream call succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) if attempt >= policy.max_retries => {
                if policy.max_retries > 0 {
                    warn!(
                        "Giving up after {} attempts: {}",
                        attempt + 1,
                        err
                    );
                }
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for(attempt, &err);
                warn!(
                    "Attempt {}/{} failed ({}), retrying in {}ms",
                    attempt + 1,
                    policy.max_retries + 1,
                    err,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
