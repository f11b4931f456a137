//! System health and request metrics handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use beacon_health::{
    HealthAggregator, HealthStatus, MetricsRecorder, PerformanceMetrics, SystemHealth,
    UptimeMonitor, UptimeStats,
};
use beacon_logger::LogDispatcher;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extract::Json;
use crate::handler::response::Acknowledged;
use crate::middleware::RouterAdminExt;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "beacon_server::handler::monitors";

/// Body of `GET /api/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub performance: PerformanceMetrics,
    pub uptime: UptimeStats,
}

/// Runs every probe; 503 when the system is unhealthy.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(health_aggregator): State<HealthAggregator>,
    State(log_dispatcher): State<LogDispatcher>,
) -> (StatusCode, Json<SystemHealth>) {
    let snapshot = health_aggregator.run().await;

    let status_code = if snapshot.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    if snapshot.overall == HealthStatus::Unhealthy {
        let failing: Vec<Value> = snapshot
            .checks
            .iter()
            .filter(|check| check.status == HealthStatus::Unhealthy)
            .map(|check| Value::from(check.name.clone()))
            .collect();

        let mut context = Map::new();
        context.insert("failing".to_owned(), Value::Array(failing));
        log_dispatcher
            .warn("System health check reported unhealthy", Some(context))
            .await;
    }

    tracing::info!(
        target: TRACING_TARGET,
        overall = %snapshot.overall,
        status_code = status_code.as_u16(),
        "Health status response prepared"
    );

    (status_code, Json(snapshot))
}

/// Returns the request counters and uptime statistics.
async fn metrics(
    State(metrics_recorder): State<MetricsRecorder>,
    State(uptime_monitor): State<UptimeMonitor>,
) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        performance: metrics_recorder.snapshot(),
        uptime: uptime_monitor.stats(),
    })
}

/// Clears the request counters.
async fn reset_metrics(State(metrics_recorder): State<MetricsRecorder>) -> Json<Acknowledged> {
    metrics_recorder.reset();
    tracing::info!(target: TRACING_TARGET, "Request metrics reset");
    Json(Acknowledged::OK)
}

/// Returns a [`Router`] with all health monitoring routes.
///
/// Only the metrics reset requires the admin token.
pub fn routes(state: ServiceState) -> Router<ServiceState> {
    let admin = Router::new()
        .route("/api/metrics/reset", post(reset_metrics))
        .with_admin_authentication(state);

    Router::new()
        .route("/api/health", get(health_status))
        .route("/api/metrics", get(metrics))
        .merge(admin)
}
