use crate::errors::AppError;
use std::future::Future;
use std::time::Duration;

/// Retry policy shared by every stats provider.
///
/// After failed attempt `i` (0-based) the caller waits `2^i * base_delay`:
/// 1s, 2s, 4s, ... with the default policy. No jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_retries: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Backoff to wait after the failed attempt with the given 0-based index.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are used up.
///
/// Returns the first success immediately. When every attempt fails, returns
/// `AppError::RetriesExhausted` wrapping the last failure. Backoff uses
/// `tokio::time::sleep`, so only the calling task waits.
pub async fn retry_fetch<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let max_attempts = policy.max_retries.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let attempts_made = attempt + 1;
                if attempts_made >= max_attempts {
                    tracing::error!(
                        attempts = attempts_made,
                        error = %e,
                        "Upstream fetch failed after max retries"
                    );
                    return Err(AppError::RetriesExhausted {
                        attempts: attempts_made,
                        source: Box::new(e),
                    });
                }

                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempts_made,
                    max_retries = max_attempts,
                    backoff_ms = delay.as_millis() as u64,
                    error = %e,
                    "Upstream fetch failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
