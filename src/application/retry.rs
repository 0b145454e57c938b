//! Bounded retry for idempotent host writes.
//!
//! Re-runs an operation while it fails with a transient `HostError`:
//! - Structural errors (host rejected the request) fail immediately
//! - Exponential backoff from a base delay, capped at `MAX_DELAY`
//! - Every failed attempt is logged with the call name

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::config::RetryConfig;
use crate::domain::error::HostResult;

const MAX_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    max_retries: usize,
    base_delay: Duration,
    exponential_backoff: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_delay_ms),
            config.max_retries,
            config.exponential_backoff,
        )
    }

    pub fn new(base_delay: Duration, max_retries: usize, exponential_backoff: bool) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay,
            exponential_backoff,
        }
    }

    /// One attempt, no waiting.
    #[cfg(test)]
    pub fn none() -> Self {
        Self::new(Duration::ZERO, 1, false)
    }

    /// Execute an operation with retry logic
    ///
    /// # Arguments
    /// * `operation` - Async closure performing one host call
    /// * `call` - Host call name, for logging
    pub async fn execute_with_retry<F, Fut, T>(&self, operation: F, call: &str) -> HostResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = HostResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!("{call} succeeded on attempt {attempt}");
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_transient() || attempt >= self.max_retries => {
                    tracing::warn!(
                        "{call} failed (attempt {attempt}/{}): {error}",
                        self.max_retries
                    );
                    return Err(error);
                }
                Err(error) => {
                    let delay = self.calculate_delay(attempt);
                    tracing::warn!(
                        "{call} failed (attempt {attempt}/{}): {error}. Retrying in {delay:?}",
                        self.max_retries
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn calculate_delay(&self, attempt: usize) -> Duration {
        if !self.exponential_backoff {
            return self.base_delay.min(MAX_DELAY);
        }
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        self.base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(MAX_DELAY)
    }

    #[cfg(test)]
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }
}
