//! Bounded retry for remote mutations
//!
//! Each attempt decides for itself whether its failure may be retried by
//! returning [`RetryError::Retryable`] or [`RetryError::NonRetryable`].
//! Attempts repeat with exponential backoff until the wall-clock budget is
//! spent. Once it is, one more attempt runs outside the loop and its result
//! is final, whatever kind of error it returns.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Default wall-clock budget for a retried operation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Retry configuration for resource operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Wall-clock budget measured from the first attempt
    pub timeout: Duration,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Same backoff schedule with a different budget
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Delay before retry number `attempt` (zero-based), capped at `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(attempt.min(32) as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

/// Outcome of a failed attempt
#[derive(Debug)]
pub enum RetryError<E> {
    /// Transient failure, try again while budget remains
    Retryable(E),
    /// Terminal failure, abort immediately
    NonRetryable(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            Self::Retryable(e) | Self::NonRetryable(e) => e,
        }
    }
}

/// Run `operation` until it succeeds, fails terminally, or the budget in
/// `config` runs out.
///
/// When the budget runs out the operation is attempted exactly once more and
/// that attempt's result is returned. A budget too large to place on the
/// clock never runs out.
pub async fn retry<T, E, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError<E>>>,
{
    let deadline = Instant::now().checked_add(config.timeout);
    let mut attempt: u32 = 0;

    while deadline.is_none_or(|d| Instant::now() < d) {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(e)) => return Err(e),
            Err(RetryError::Retryable(e)) => {
                let delay = match deadline {
                    Some(d) => config
                        .delay_for_attempt(attempt)
                        .min(d.saturating_duration_since(Instant::now())),
                    None => config.delay_for_attempt(attempt),
                };
                tracing::warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retryable error, trying again"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }

    tracing::debug!(
        attempts = attempt,
        timeout_secs = config.timeout.as_secs(),
        "Retry budget exhausted, making final attempt"
    );
    operation().await.map_err(RetryError::into_inner)
}
