//! Concurrent health-check aggregation.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use beacon_core::Environment;
use futures::FutureExt;
use futures::future::join_all;
use jiff::Timestamp;

use crate::{
    HealthCheck, HealthProbe, HealthStatus, SystemHealth, TRACING_TARGET_AGGREGATOR,
    UptimeMonitor,
};

/// Name of the synthetic check reported when the fan-out itself fails.
pub const SYSTEM_CHECK_NAME: &str = "health-check-system";

/// Runs every probe concurrently and reduces the outcomes.
///
/// Cloning shares the probes and the uptime monitor.
#[derive(Clone)]
pub struct HealthAggregator {
    probes: Vec<Arc<dyn HealthProbe>>,
    uptime: Option<UptimeMonitor>,
    environment: Environment,
    version: String,
    started_at: Instant,
}

impl std::fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let probes: Vec<&str> = self.probes.iter().map(|p| p.name()).collect();
        f.debug_struct("HealthAggregator")
            .field("probes", &probes)
            .field("environment", &self.environment)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl HealthAggregator {
    /// Creates an aggregator without probes. Process uptime counts from now.
    pub fn new(environment: Environment) -> Self {
        Self {
            probes: Vec::new(),
            uptime: None,
            environment,
            version: env!("CARGO_PKG_VERSION").to_owned(),
            started_at: Instant::now(),
        }
    }

    /// Adds a probe. Checks are reported in registration order.
    #[must_use]
    pub fn with_probe(mut self, probe: impl HealthProbe + 'static) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    /// Records every run's outcome into `monitor`.
    #[must_use]
    pub fn with_uptime_monitor(mut self, monitor: UptimeMonitor) -> Self {
        self.uptime = Some(monitor);
        self
    }

    /// Overrides the reported version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Overrides the instant process uptime is measured from.
    #[must_use]
    pub fn with_started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    /// Returns the attached uptime monitor.
    pub fn uptime_monitor(&self) -> Option<&UptimeMonitor> {
        self.uptime.as_ref()
    }

    /// Runs all probes and returns the snapshot. Never fails.
    ///
    /// A panicking probe is reported as an unhealthy check under its own
    /// name. A panic outside any probe yields an unhealthy snapshot holding
    /// one check that describes the failure.
    pub async fn run(&self) -> SystemHealth {
        let started = Instant::now();
        tracing::info!(
            target: TRACING_TARGET_AGGREGATOR,
            probes = self.probes.len(),
            "Running health checks"
        );

        let fan_out = join_all(self.probes.iter().map(|probe| guarded_check(probe.as_ref())));
        let (overall, checks) = match AssertUnwindSafe(fan_out).catch_unwind().await {
            Ok(checks) => (HealthStatus::reduce(checks.iter().map(|c| c.status)), checks),
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::error!(
                    target: TRACING_TARGET_AGGREGATOR,
                    reason = %reason,
                    "Health check run failed"
                );
                let check = HealthCheck::unhealthy(
                    SYSTEM_CHECK_NAME,
                    format!("Health check system failure: {reason}"),
                )
                .with_response_time(started.elapsed());
                (HealthStatus::Unhealthy, vec![check])
            }
        };

        if let Some(monitor) = &self.uptime {
            monitor.record_check(overall == HealthStatus::Healthy);
        }

        let elapsed = started.elapsed();
        tracing::info!(
            target: TRACING_TARGET_AGGREGATOR,
            overall = %overall,
            checks = checks.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Health checks completed"
        );

        SystemHealth {
            overall,
            checks,
            timestamp: Timestamp::now(),
            uptime: self.started_at.elapsed().as_secs(),
            version: self.version.clone(),
            environment: self.environment,
        }
    }
}

/// Runs one probe, turning a panic into an unhealthy check.
async fn guarded_check(probe: &dyn HealthProbe) -> HealthCheck {
    let started = Instant::now();
    match AssertUnwindSafe(probe.check()).catch_unwind().await {
        Ok(check) => check,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            let name = probe.name();
            tracing::error!(
                target: TRACING_TARGET_AGGREGATOR,
                probe = name,
                reason = %reason,
                "Health probe panicked"
            );
            HealthCheck::unhealthy(name, format!("Health check panicked: {reason}"))
                .with_response_time(started.elapsed())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
