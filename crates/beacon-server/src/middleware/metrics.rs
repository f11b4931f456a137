//! Per-route request metrics.

use axum::Router;
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use beacon_health::MetricsRecorder;
use tokio::time::Instant;

use super::TRACING_TARGET_METRICS;

/// Endpoint name used for requests no route matched.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Records latency and outcome of every request under its matched route.
///
/// Responses with a 5xx status count as errors.
pub async fn track_request_metrics(
    State(recorder): State<MetricsRecorder>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ENDPOINT, MatchedPath::as_str)
        .to_owned();

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let status = response.status();
    recorder.record(&endpoint, elapsed, status.is_server_error());

    tracing::debug!(
        target: TRACING_TARGET_METRICS,
        method = %method,
        endpoint = %endpoint,
        status = status.as_u16(),
        duration_ms = elapsed.as_millis() as u64,
        "Request completed"
    );

    response
}

/// Extension trait for `axum::`[`Router`] to record request metrics.
pub trait RouterMetricsExt<S> {
    /// Layers [`track_request_metrics`] over every route added so far.
    fn with_metrics(self, recorder: MetricsRecorder) -> Self;
}

impl<S> RouterMetricsExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_metrics(self, recorder: MetricsRecorder) -> Self {
        self.layer(from_fn_with_state(recorder, track_request_metrics))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    async fn failing() -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    #[tokio::test]
    async fn records_under_matched_route() -> anyhow::Result<()> {
        let recorder = MetricsRecorder::new();
        let app = Router::new()
            .route("/items/{id}", get(|| async { "ok" }))
            .route("/broken", get(failing))
            .with_metrics(recorder.clone());
        let server = TestServer::new(app)?;

        server.get("/items/1").await.assert_status_ok();
        server.get("/items/2").await.assert_status_ok();
        server.get("/broken").await.assert_status(StatusCode::BAD_GATEWAY);

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.request_count, 3);
        assert_eq!(snapshot.endpoints["/items/{id}"].count, 2);
        assert_eq!(snapshot.endpoints["/broken"].errors, 1);
        assert!((snapshot.error_rate - 1.0 / 3.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn client_errors_are_not_failures() -> anyhow::Result<()> {
        let recorder = MetricsRecorder::new();
        let app = Router::new()
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .with_metrics(recorder.clone());
        let server = TestServer::new(app)?;

        server.get("/missing").await.assert_status_not_found();

        assert_eq!(recorder.snapshot().endpoints["/missing"].errors, 0);
        Ok(())
    }
}
