//! Error report submission.

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use beacon_logger::{ErrorLogger, ErrorSnapshot, LogLevel, LogRecord, RequestInfo};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::extract::{ClientInfo, Json, ValidateJson};
use crate::handler::response::Acknowledged;
use crate::service::ServiceState;

/// Tracing target for error submissions.
const TRACING_TARGET: &str = "beacon_server::handler::log_error";

/// Body of `POST /api/log-error`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogErrorRequest {
    /// What went wrong.
    #[validate(length(min = 1, max = 10000))]
    pub message: String,
    /// The error that caused the report.
    #[serde(default)]
    pub error: Option<ErrorSnapshot>,
    /// Free-form diagnostic fields.
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
    /// Severity, `error` when omitted.
    #[serde(default)]
    pub level: Option<LogLevel>,
    /// Page the report originates from; the request URI when omitted.
    #[validate(length(max = 2048))]
    #[serde(default)]
    pub url: Option<String>,
}

impl LogErrorRequest {
    /// Builds the record, merging caller metadata into the context.
    fn into_record(self, client: ClientInfo) -> LogRecord {
        let url = self.url.unwrap_or_else(|| client.uri.to_string());
        let method = client.method.as_str().to_owned();

        let mut context = self.context.unwrap_or_default();
        context.insert("method".to_owned(), Value::from(method.clone()));
        context.insert("url".to_owned(), Value::from(url.clone()));
        context.insert(
            "userAgent".to_owned(),
            client.user_agent.clone().map_or(Value::Null, Value::from),
        );
        context.insert("ip".to_owned(), Value::from(client.ip.clone()));

        let request = RequestInfo {
            method,
            url,
            user_agent: client.user_agent,
            ip: Some(client.ip),
        };

        let record = LogRecord::new(self.level.unwrap_or_default(), self.message)
            .with_context(context)
            .with_request(request);

        match self.error {
            Some(error) => record.with_error(error),
            None => record,
        }
    }
}

/// Appends one record to the current log file.
#[tracing::instrument(skip_all, fields(ip = %client.ip))]
async fn log_error(
    State(error_logger): State<ErrorLogger>,
    client: ClientInfo,
    ValidateJson(request): ValidateJson<LogErrorRequest>,
) -> Json<Acknowledged> {
    let record = request.into_record(client);
    error_logger.log_to_file(&record).await;

    tracing::info!(
        target: TRACING_TARGET,
        record_id = %record.id,
        level = %record.level,
        "Error report received"
    );

    Json(Acknowledged::OK)
}

/// Returns a [`Router`] with the submission route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/log-error", post(log_error))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::handler::test::{create_test_server_with_state, create_test_state};

    #[tokio::test]
    async fn appends_exactly_one_line() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let logger = state.error_logger().clone();
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/api/log-error")
            .add_header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .add_header("user-agent", "site-test/1.0")
            .json(&json!({
                "message": "Checkout button exploded",
                "error": { "name": "TypeError", "message": "x is undefined", "stack": "at checkout" },
                "context": { "component": "Checkout" },
                "url": "https://example.com/checkout"
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Acknowledged>(), Acknowledged::OK);

        let contents = std::fs::read_to_string(logger.current_file())?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);

        let record: LogRecord = serde_json::from_str(lines[0])?;
        assert_eq!(record.message, "Checkout button exploded");
        assert_eq!(record.level, LogLevel::Error);
        assert_eq!(record.error.as_ref().map(|e| e.name.as_str()), Some("TypeError"));

        let context = record.context.as_ref().unwrap();
        assert_eq!(context["component"], "Checkout");
        assert_eq!(context["method"], "POST");
        assert_eq!(context["url"], "https://example.com/checkout");
        assert_eq!(context["userAgent"], "site-test/1.0");
        assert_eq!(context["ip"], "203.0.113.7");
        Ok(())
    }

    #[tokio::test]
    async fn defaults_url_and_ip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let logger = state.error_logger().clone();
        let server = create_test_server_with_state(routes(), state)?;

        server
            .post("/api/log-error")
            .json(&json!({ "message": "warned", "level": "warn" }))
            .await
            .assert_status_ok();

        let records = logger.recent_logs(10).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Warn);

        let context = records[0].context.as_ref().unwrap();
        assert!(context["url"].as_str().unwrap().ends_with("/api/log-error"));
        assert_eq!(context["ip"], "unknown");
        Ok(())
    }

    #[tokio::test]
    async fn empty_message_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let logger = state.error_logger().clone();
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/api/log-error")
            .json(&json!({ "message": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["timestamp"].is_string());
        assert!(!logger.current_file().exists());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/api/log-error")
            .text("{not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_level_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let server = create_test_server_with_state(routes(), state)?;

        let response = server
            .post("/api/log-error")
            .json(&json!({ "message": "m", "level": "fatal" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }
}
