//! Retry policy for registrar gateway calls.
//!
//! Every gateway call is rate-limited on the registrar side and fails
//! transiently often enough that a single attempt is never acceptable.
//! The policy retries only transport-class errors
//! ([`RegistrarError::is_retryable`]); registrar-reported business errors
//! are returned to the caller untouched.

use std::future::Future;
use std::time::Duration;

use crate::error::{RegistrarError, Result};

/// Longest a registrar-suggested `retry_after` is honored for.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Bounded exponential backoff around a single registrar operation.
///
/// # Retry strategy
///
/// - Only transient errors (`Transport`, `Timeout`, `RateLimited`) are
///   retried; business errors return immediately.
/// - Delays double from `initial_interval` up to `max_interval`;
///   rate-limit errors carrying a server-suggested wait use that instead.
/// - Once the total elapsed time plus the next delay would reach
///   `max_elapsed`, the last error is wrapped in
///   [`TransientFailure`](RegistrarError::TransientFailure) and returned.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    initial_interval: Duration,
    max_interval: Duration,
    max_elapsed: Duration,
}

impl Default for RetryPolicy {
    /// 100ms doubling to a 10s cap, inside a 30s total budget.
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(10),
            max_elapsed: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Builds a policy with explicit intervals.
    pub fn new(initial_interval: Duration, max_interval: Duration, max_elapsed: Duration) -> Self {
        Self {
            initial_interval,
            max_interval,
            max_elapsed,
        }
    }

    /// A policy that never retries. Every error is returned as-is.
    pub fn none() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            max_elapsed: Duration::ZERO,
        }
    }

    /// Invokes `f` until it succeeds, fails with a non-retryable error, or
    /// the elapsed budget runs out.
    ///
    /// `op` names the operation for log output only.
    pub async fn call<T, F, Fut>(&self, op: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = tokio::time::Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match f().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    let delay = self.retry_delay(&e, attempts - 1);
                    if started.elapsed() + delay >= self.max_elapsed {
                        return Err(RegistrarError::TransientFailure {
                            attempts,
                            source: Box::new(e),
                        });
                    }
                    log::warn!(
                        "{op} failed (attempt {attempts}), retrying in {:.1}s: {e}",
                        delay.as_secs_f32()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Delay before the retry following failed attempt number `attempt`
    /// (zero-based).
    ///
    /// A `RateLimited` error with a server-suggested wait uses that value,
    /// capped at [`MAX_RETRY_AFTER_SECS`]; everything else backs off
    /// exponentially.
    fn retry_delay(&self, error: &RegistrarError, attempt: u32) -> Duration {
        if let RegistrarError::RateLimited {
            retry_after: Some(secs),
            ..
        } = error
        {
            Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))
        } else {
            self.backoff_delay(attempt)
        }
    }

    /// `initial_interval * 2^attempt`, capped at `max_interval`.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let capped_attempt = attempt.min(20); // keep 2^attempt in range
        let factor = 1_u64 << capped_attempt;
        let delay_ms = (self.initial_interval.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay_ms).min(self.max_interval)
    }
}
