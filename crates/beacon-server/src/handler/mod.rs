//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! ```rust,no_run
//! use beacon_server::handler::app;
//! use beacon_server::middleware::RecoveryConfig;
//! use beacon_server::service::{ServiceConfig, ServiceState};
//!
//! # fn example() -> beacon_core::Result<()> {
//! let state = ServiceState::from_config(&ServiceConfig::default())?;
//! let router = app(state, &RecoveryConfig::default());
//! # let _ = router;
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod log_error;
mod logs;
mod monitors;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::log_error::LogErrorRequest;
pub use crate::handler::logs::{
    ClearLogsQuery, ClearLogsResponse, DEFAULT_LOG_LIMIT, DEFAULT_RETENTION_DAYS, LogsQuery,
    LogsResponse, MAX_LOG_LIMIT,
};
pub use crate::handler::monitors::MetricsResponse;
pub use crate::handler::response::{Acknowledged, ErrorResponse};
use crate::middleware::{
    RecoveryConfig, RouterMetricsExt, RouterObservabilityExt, RouterRecoveryExt,
};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route and the not-found fallback.
///
/// Log retrieval, log clearing and metrics reset require the admin token
/// held by `state`.
pub fn routes(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .merge(log_error::routes())
        .merge(monitors::routes(state.clone()))
        .merge(logs::routes(state))
        .fallback(handler)
}

/// Returns the application: [`routes`] with recovery, request metrics and
/// tracing layered on, bound to `state`.
pub fn app(state: ServiceState, recovery: &RecoveryConfig) -> Router {
    let recorder = state.metrics_recorder().clone();
    routes(state.clone())
        .with_recovery(recovery)
        .with_metrics(recorder)
        .with_observability()
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test {
    use std::path::Path;

    use axum::Router;
    use axum_test::TestServer;
    use beacon_core::Environment;
    use beacon_health::HealthAggregator;
    use beacon_logger::LoggerConfig;

    use crate::middleware::{RecoveryConfig, UNMATCHED_ENDPOINT};
    use crate::service::{ServiceConfig, ServiceState};

    /// Admin token configured by [`create_test_state`].
    pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

    /// Returns a test-environment state logging into `log_dir`, without
    /// health probes.
    pub fn create_test_state(log_dir: &Path) -> anyhow::Result<ServiceState> {
        let config = ServiceConfig::default()
            .with_environment(Environment::Test)
            .with_logger(LoggerConfig::new(log_dir))
            .with_admin_token(TEST_ADMIN_TOKEN);
        let state = ServiceState::from_config(&config)?
            .with_health_aggregator(HealthAggregator::new(Environment::Test));
        Ok(state)
    }

    /// Returns the `Authorization` header value carrying [`TEST_ADMIN_TOKEN`].
    pub fn admin_bearer() -> String {
        format!("Bearer {TEST_ADMIN_TOKEN}")
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: Router<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router.with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    #[tokio::test]
    async fn unknown_route_is_structured_not_found() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let server = create_test_server_with_state(super::routes(state.clone()), state)?;

        let response = server.get("/api/nope").await;
        response.assert_status_not_found();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        Ok(())
    }

    #[tokio::test]
    async fn app_records_requests_per_route() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let recorder = state.metrics_recorder().clone();
        let server = TestServer::new(super::app(state, &RecoveryConfig::default()))?;

        server.get("/api/health").await.assert_status_ok();
        server.get("/api/health").await.assert_status_ok();
        server.get("/nowhere").await.assert_status_not_found();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.endpoints["/api/health"].count, 2);
        assert_eq!(snapshot.endpoints[UNMATCHED_ENDPOINT].count, 1);
        assert_eq!(snapshot.error_rate, 0.0);
        Ok(())
    }
}
