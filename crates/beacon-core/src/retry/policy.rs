//! Retry policy configuration and presets.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::classify::{Classify, is_retryable};
use crate::{Error, Result};

/// Bounds and backoff shape for [`retry`](super::retry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Factor applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
    /// Substrings or classification codes that mark a failure as transient.
    ///
    /// When absent or empty, the default heuristic applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable_patterns: Option<Vec<String>>,
}

impl RetryPolicy {
    /// Creates a policy without explicit patterns.
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            backoff_multiplier,
            retryable_patterns: None,
        }
    }

    /// Profile for the source-control API: many attempts, long delays.
    pub fn github() -> Self {
        Self::new(5, Duration::from_secs(2), Duration::from_secs(30), 2.0)
    }

    /// Profile for the email provider.
    pub fn email() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(10), 2.0)
    }

    /// Profile for generic API calls: few attempts, short delays.
    pub fn api() -> Self {
        Self::new(2, Duration::from_millis(500), Duration::from_secs(5), 1.5)
    }

    /// Replaces the retryable patterns.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.retryable_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Rejects policies that would never run or would shrink their delays.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::configuration("max_attempts must be at least 1"));
        }

        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(Error::configuration(format!(
                "backoff_multiplier must be at least 1.0, got {}",
                self.backoff_multiplier
            )));
        }

        if self.max_delay < self.base_delay {
            return Err(Error::configuration("max_delay must not be below base_delay"));
        }

        Ok(())
    }

    /// Delay to wait after the given failed attempt (1-indexed).
    ///
    /// Computes `min(base * multiplier^(attempt - 1), max_delay)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;
        let delay_ms = (base_ms * self.backoff_multiplier.powi(exponent)).min(max_ms);

        Duration::from_millis(delay_ms.max(0.0).round() as u64)
    }

    /// Check if `error` should be retried under this policy.
    pub fn is_retryable<E>(&self, error: &E) -> bool
    where
        E: Classify + ?Sized,
    {
        is_retryable(error, self.retryable_patterns.as_deref())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::api()
    }
}
