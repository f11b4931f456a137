#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for health aggregation.
pub const TRACING_TARGET_AGGREGATOR: &str = "beacon_health::aggregator";

/// Tracing target for individual probes.
pub const TRACING_TARGET_PROBE: &str = "beacon_health::probe";

mod aggregator;
mod metrics;
mod status;
mod uptime;

pub mod probe;

pub use aggregator::{HealthAggregator, SYSTEM_CHECK_NAME};
pub use metrics::{EndpointMetrics, MetricsRecorder, PerformanceMetrics};
#[cfg(feature = "reqwest")]
pub use probe::HttpConnectivity;
pub use probe::{
    Connectivity, ConnectivityProbe, EnvironmentProbe, FilesystemProbe, HealthProbe,
};
pub use status::{HealthCheck, HealthStatus, SystemHealth};
pub use uptime::{UptimeMonitor, UptimeStats, format_uptime};
