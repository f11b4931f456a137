//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Bearer token guard for maintenance routes
//! - Request metrics recorded under the matched route
//! - Request ids and HTTP tracing
//! - Recovery from panics and timeouts
//!
//! ```rust,no_run
//! use axum::Router;
//! use beacon_health::MetricsRecorder;
//! use beacon_server::middleware::{
//!     RecoveryConfig, RouterMetricsExt, RouterObservabilityExt, RouterRecoveryExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_recovery(&RecoveryConfig::default())
//!     .with_metrics(MetricsRecorder::new())
//!     .with_observability();
//! ```

mod admin;
mod metrics;
mod observability;
mod recovery;

pub use admin::{RouterAdminExt, require_admin_token};
pub use metrics::{RouterMetricsExt, UNMATCHED_ENDPOINT, track_request_metrics};
pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};

/// Tracing target for maintenance route authentication.
pub const TRACING_TARGET_ADMIN: &str = "beacon_server::middleware::admin";

/// Tracing target for request metrics.
pub const TRACING_TARGET_METRICS: &str = "beacon_server::middleware::metrics";

/// Tracing target for error recovery.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "beacon_server::middleware::recovery::error";

/// Tracing target for panic recovery.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "beacon_server::middleware::recovery::panic";
