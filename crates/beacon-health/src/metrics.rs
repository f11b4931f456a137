//! Per-endpoint request metrics.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Counters for one logical endpoint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointMetrics {
    pub count: u64,
    /// Cumulative handler time in milliseconds.
    pub total_time: u64,
    pub errors: u64,
}

/// Snapshot of the recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub request_count: u64,
    /// Mean handler time in milliseconds across all endpoints.
    pub average_response_time: f64,
    /// Fraction of requests that failed, in `[0, 1]`.
    pub error_rate: f64,
    pub endpoints: BTreeMap<String, EndpointMetrics>,
    pub last_reset: Timestamp,
}

#[derive(Debug)]
struct MetricsState {
    request_count: u64,
    total_time: u64,
    error_count: u64,
    endpoints: BTreeMap<String, EndpointMetrics>,
    last_reset: Timestamp,
}

impl MetricsState {
    fn new() -> Self {
        Self {
            request_count: 0,
            total_time: 0,
            error_count: 0,
            endpoints: BTreeMap::new(),
            last_reset: Timestamp::now(),
        }
    }
}

/// Process-lifetime request counters.
///
/// Cloning shares the counters. Every update is a single locked step with no
/// suspension point inside.
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    state: Arc<Mutex<MetricsState>>,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    /// Creates a recorder with zeroed counters.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MetricsState::new())),
        }
    }

    /// Records one settled request.
    pub fn record(&self, endpoint: &str, elapsed: Duration, is_error: bool) {
        let millis: u64 = elapsed.as_millis().try_into().unwrap_or(u64::MAX);
        let mut state = self.state.lock();

        state.request_count += 1;
        state.total_time = state.total_time.saturating_add(millis);
        if is_error {
            state.error_count += 1;
        }

        let entry = state.endpoints.entry(endpoint.to_owned()).or_default();
        entry.count += 1;
        entry.total_time = entry.total_time.saturating_add(millis);
        if is_error {
            entry.errors += 1;
        }
    }

    /// Awaits `future`, records its latency and outcome under `endpoint`,
    /// and returns its result untouched.
    pub async fn track<F, T, E>(&self, endpoint: &str, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let result = future.await;
        self.record(endpoint, started.elapsed(), result.is_err());
        result
    }

    /// Returns a copy of the counters with derived averages.
    pub fn snapshot(&self) -> PerformanceMetrics {
        let state = self.state.lock();
        let (average_response_time, error_rate) = match state.request_count {
            0 => (0.0, 0.0),
            n => (
                state.total_time as f64 / n as f64,
                state.error_count as f64 / n as f64,
            ),
        };

        PerformanceMetrics {
            request_count: state.request_count,
            average_response_time,
            error_rate,
            endpoints: state.endpoints.clone(),
            last_reset: state.last_reset,
        }
    }

    /// Clears every counter and stamps the reset time.
    pub fn reset(&self) {
        *self.state.lock() = MetricsState::new();
    }
}
