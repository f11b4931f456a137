//! Recent log records.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use beacon_logger::{ErrorLogger, LogRecord};
use serde::{Deserialize, Serialize};

use crate::extract::{Json, Query};
use crate::middleware::RouterAdminExt;
use crate::service::ServiceState;

/// Tracing target for log retrieval.
const TRACING_TARGET: &str = "beacon_server::handler::logs";

/// Number of records returned when no limit is given.
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// Upper bound on the number of records returned.
pub const MAX_LOG_LIMIT: usize = 500;

/// Age in days past which `DELETE /api/logs` removes files by default.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Query of `GET /api/logs`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsQuery {
    /// Maximum number of records; clamped to [`MAX_LOG_LIMIT`].
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LogsQuery {
    /// Returns the limit after defaults and clamping.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT)
    }
}

/// Body of `GET /api/logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogsResponse {
    pub count: usize,
    pub logs: Vec<LogRecord>,
}

/// Query of `DELETE /api/logs`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearLogsQuery {
    /// Files last modified more than this many days ago are deleted.
    #[serde(default)]
    pub older_than_days: Option<u32>,
}

/// Body of `DELETE /api/logs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearLogsResponse {
    pub success: bool,
    pub removed: usize,
}

/// Returns the most recent records, newest first.
async fn recent_logs(
    State(error_logger): State<ErrorLogger>,
    Query(query): Query<LogsQuery>,
) -> Json<LogsResponse> {
    let limit = query.effective_limit();
    let logs = error_logger.recent_logs(limit).await;

    tracing::debug!(
        target: TRACING_TARGET,
        limit,
        count = logs.len(),
        "Recent logs read"
    );

    Json(LogsResponse {
        count: logs.len(),
        logs,
    })
}

/// Deletes log files older than the retention window.
async fn clear_logs(
    State(error_logger): State<ErrorLogger>,
    Query(query): Query<ClearLogsQuery>,
) -> Json<ClearLogsResponse> {
    let older_than_days = query.older_than_days.unwrap_or(DEFAULT_RETENTION_DAYS);
    let removed = error_logger.clear_logs(older_than_days).await;

    tracing::info!(
        target: TRACING_TARGET,
        older_than_days,
        removed,
        "Old log files cleared"
    );

    Json(ClearLogsResponse {
        success: true,
        removed,
    })
}

/// Returns a [`Router`] with the log retrieval routes, guarded by the
/// admin token.
pub fn routes(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/api/logs", get(recent_logs).delete(clear_logs))
        .with_admin_authentication(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use beacon_logger::LogLevel;

    use super::*;
    use crate::handler::test::{admin_bearer, create_test_server_with_state, create_test_state};

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(LogsQuery::default().effective_limit(), DEFAULT_LOG_LIMIT);
        assert_eq!(LogsQuery { limit: Some(7) }.effective_limit(), 7);
        assert_eq!(LogsQuery { limit: Some(10_000) }.effective_limit(), MAX_LOG_LIMIT);
    }

    #[tokio::test]
    async fn returns_newest_first() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        for message in ["first", "second", "third"] {
            let record = LogRecord::new(LogLevel::Error, message);
            state.error_logger().log_to_file(&record).await;
        }
        let server = create_test_server_with_state(routes(state.clone()), state)?;

        let response = server
            .get("/api/logs")
            .add_header("authorization", admin_bearer())
            .add_query_param("limit", 2)
            .await;
        response.assert_status_ok();

        let body = response.json::<LogsResponse>();
        assert_eq!(body.count, 2);
        let messages: Vec<&str> = body.logs.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second"]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_directory_yields_no_records() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(&dir.path().join("missing"))?;
        let server = create_test_server_with_state(routes(state.clone()), state)?;

        let body = server
            .get("/api/logs")
            .add_header("authorization", admin_bearer())
            .await
            .json::<LogsResponse>();
        assert_eq!(body.count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn clearing_keeps_recent_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let record = LogRecord::new(LogLevel::Error, "fresh");
        state.error_logger().log_to_file(&record).await;
        let server = create_test_server_with_state(routes(state.clone()), state)?;

        let response = server
            .delete("/api/logs")
            .add_header("authorization", admin_bearer())
            .add_query_param("olderThanDays", 1)
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<ClearLogsResponse>(),
            ClearLogsResponse {
                success: true,
                removed: 0
            }
        );

        let body = server
            .get("/api/logs")
            .add_header("authorization", admin_bearer())
            .await
            .json::<LogsResponse>();
        assert_eq!(body.count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn non_numeric_limit_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let server = create_test_server_with_state(routes(state.clone()), state)?;

        let response = server
            .get("/api/logs")
            .add_header("authorization", admin_bearer())
            .add_query_param("limit", "many")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn log_routes_require_admin_token() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let record = LogRecord::new(LogLevel::Error, "private");
        state.error_logger().log_to_file(&record).await;
        let server = create_test_server_with_state(routes(state.clone()), state)?;

        server
            .get("/api/logs")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/api/logs")
            .add_query_param("olderThanDays", 0)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .get("/api/logs")
            .add_header("authorization", admin_bearer())
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<LogsResponse>().count, 1);
        Ok(())
    }
}
