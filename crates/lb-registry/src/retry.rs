//! Bounded retry for upstream calls.
//!
//! One policy is shared by every fetcher: a maximum number of attempts and a
//! fixed or exponential delay between them, capped at `max_delay`. A 429 waits
//! for the server's `Retry-After` (also capped). Only errors that
//! [`RegistryError::is_retryable`] accepts are retried; the last error is
//! returned once attempts are exhausted.

use std::future::Future;
use std::time::Duration;

use lb_config::{Backoff, RetryConfig};

use crate::error::RegistryError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
            backoff: config.backoff,
        }
    }

    /// Delay after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &RegistryError) -> Duration {
        let delay = match error {
            RegistryError::RateLimited { retry_after_secs } => {
                Duration::from_secs(*retry_after_secs)
            }
            _ => match self.backoff {
                Backoff::Fixed => self.base_delay,
                Backoff::Exponential => {
                    let exp = attempt.saturating_sub(1).min(16);
                    self.base_delay.saturating_mul(1 << exp)
                }
            },
        };
        delay.min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RegistryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RegistryError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts && error.is_retryable() => {
                    let delay = self.delay_for(attempt, &error);
                    tracing::debug!(
                        label,
                        attempt,
                        ?delay,
                        %error,
                        "retrying upstream call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
