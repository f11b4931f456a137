//! Retry with exponential backoff.
//!
//! [`retry`] runs an async operation until it succeeds, fails with an error
//! that is not worth retrying, or exhausts [`RetryPolicy::max_attempts`].

mod classify;
mod policy;

use std::fmt::Display;
use std::future::Future;

pub use classify::{Classify, is_retryable};
pub use policy::RetryPolicy;

use crate::TRACING_TARGET_RETRY;

/// Executes `operation` under `policy`.
///
/// Attempts are strictly sequential. The last error is returned as soon as it
/// is classified as non-retryable or the attempt budget is spent; no delay
/// follows a terminal failure.
pub async fn retry<T, E, F, Fut>(label: &str, policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        target: TRACING_TARGET_RETRY,
                        operation = label,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        let retryable = policy.is_retryable(&error);
        if !retryable || attempt >= max_attempts {
            tracing::error!(
                target: TRACING_TARGET_RETRY,
                operation = label,
                attempt,
                max_attempts,
                retryable,
                error = %error,
                "Operation failed"
            );
            return Err(error);
        }

        let delay = policy.delay_for_attempt(attempt);
        tracing::warn!(
            target: TRACING_TARGET_RETRY,
            operation = label,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Operation failed, retrying"
        );

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
