//! Retry engine for mail delivery.
//!
//! Executes a delivery attempt repeatedly with exponential backoff and
//! jitter, bounded by a caller-supplied cancellation token. The backoff
//! wait is the only suspension point: it is a race between the backoff
//! timer and the cancellation signal, and whichever loses is dropped
//! with the `select!`. An in-flight attempt is never interrupted.
//!
//! Convention: `max_retries` is the TOTAL attempt budget; the first
//! attempt counts against it. `max_retries = 0` performs no attempt and
//! fails with `RetriesExhausted` immediately.

use std::future::Future;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::RetryConfig;
use crate::errors::{MailError, MailResult};

/// Retry executor with exponential backoff and jitter.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates a new retry executor.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Executes an async operation until it succeeds, the attempt
    /// budget is exhausted, or the token is cancelled during a backoff
    /// wait.
    ///
    /// Every attempt failure is retried identically; there is no
    /// error-kind-based suppression. `RetriesExhausted` carries the
    /// last attempt error as its source.
    pub async fn execute<F, Fut, T>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> MailResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = MailResult<T>>,
    {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut last_error: Option<MailError> = None;

        for attempt in 1..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "delivery attempt failed"
                    );
                    last_error = Some(e);
                }
            }

            if attempt == self.config.max_retries {
                break;
            }

            let delay = self.backoff_delay(attempt, &mut rng);

            tokio::select! {
                () = sleep(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "retrying send");
                }
                () = cancel.cancelled() => {
                    return Err(MailError::timeout());
                }
            }
        }

        let mut err = MailError::retries_exhausted(self.config.max_retries);
        if let Some(last) = last_error {
            err = err.with_cause(last);
        }
        Err(err)
    }

    /// Computes the delay before the retry following failed attempt
    /// `attempt` (1-indexed): `base_delay * 2^attempt`, capped at
    /// `max_delay`, plus `jitter_unit * k` with `k` uniform in
    /// `[0, attempt)`. The exponent uses the loop index so the backoff
    /// strictly increases; the jitter is zero on the first backoff and
    /// grows with later attempts.
    fn backoff_delay(&self, attempt: u32, rng: &mut StdRng) -> Duration {
        let backoff = 2u32
            .checked_pow(attempt)
            .and_then(|factor| self.config.base_delay.checked_mul(factor))
            .unwrap_or(self.config.max_delay)
            .min(self.config.max_delay);

        let jitter = self
            .config
            .jitter_unit
            .checked_mul(rng.gen_range(0..attempt))
            .unwrap_or(Duration::ZERO);

        backoff + jitter
    }
}
