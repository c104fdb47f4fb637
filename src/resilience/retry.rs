use std::future::Future;

use tokio::time::{sleep, Duration};
use tracing::{error, warn};

use crate::config::settings::RetryConfig;
use crate::errors::SendFailure;

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub attempts: u32,
    pub base_delay_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl From<&RetryConfig> for RetrySettings {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            attempts: cfg.attempts.max(1),
            base_delay_ms: cfg.base_delay_ms,
            min_delay_ms: cfg.min_delay_ms,
            max_delay_ms: cfg.max_delay_ms.max(cfg.min_delay_ms),
        }
    }
}

impl RetrySettings {
    /// Delay to wait after the `attempt`-th (1-based) failure.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let raw = self.base_delay_ms.saturating_mul(1u64 << shift);
        Duration::from_millis(raw.clamp(self.min_delay_ms, self.max_delay_ms))
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable failure,
    /// or the attempt budget is spent.
    pub async fn run_with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T, SendFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, SendFailure>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "attempt {attempt}/{} failed: {e:?}, retrying in {}ms",
                        self.attempts,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    error!("all {attempt} attempts failed: {e:?}");
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
