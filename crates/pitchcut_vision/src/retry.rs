//! Retry with exponential backoff for analyzer calls.
//!
//! Every error kind stays inside the retry budget: transient failures
//! obviously, but also schema-validation failures, because re-invoking
//! the model on the same window may sample a valid response.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Retry policy for a single analyzer window call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts per window.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay_ms: u64,
    /// Hard upper bound on any backoff sleep.
    pub max_delay_ms: u64,
    /// Per-attempt call timeout.
    pub timeout_ms: u64,
    /// Random jitter applied to each sleep (0.0 to 1.0). Zero in tests.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 2000,
            max_delay_ms: 30_000,
            timeout_ms: 180_000,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    /// Backoff delay before retry number `attempt` (0-based), doubling
    /// from the initial delay and capped at the maximum.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = (self.initial_delay_ms as f64) * 2f64.powi(attempt.min(16) as i32);
        let capped = base.min(self.max_delay_ms as f64);

        let with_jitter = if self.jitter_factor > 0.0 {
            use rand::Rng;
            let jitter = rand::thread_rng().gen_range(-self.jitter_factor..=self.jitter_factor);
            capped * (1.0 + jitter)
        } else {
            capped
        };

        Duration::from_millis(with_jitter.max(0.0) as u64)
    }

    /// Per-attempt timeout as a `Duration`.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Runs `operation` with the configured per-attempt timeout, retrying
/// with exponential backoff until the attempt budget is spent.
///
/// # Errors
///
/// Returns the last attempt's error once the budget is exhausted.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_retries.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        debug!("{operation_name}: attempt {}/{attempts}", attempt + 1);

        let outcome = match timeout(config.call_timeout(), operation()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                seconds: config.timeout_ms / 1000,
            }),
        };

        match outcome {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{operation_name}: succeeded on attempt {}", attempt + 1);
                }
                return Ok(value);
            }
            Err(e) => {
                warn!(
                    "{operation_name}: attempt {}/{attempts} failed ({}): {e}",
                    attempt + 1,
                    if e.is_transient() { "transient" } else { "permanent" },
                );
                last_error = Some(e);

                if attempt + 1 < attempts {
                    let delay = config.delay_for_attempt(attempt);
                    debug!("{operation_name}: retrying in {delay:?}");
                    sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or(Error::EmptyResponse))
}
