//! Networked log sink.

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use super::{HttpClient, Result, TRACING_TARGET};
use crate::{ErrorSnapshot, LogLevel, LogRecord, LogSink};

/// Path of the submission endpoint relative to the site origin.
pub const LOG_ENDPOINT_PATH: &str = "/api/log-error";

/// Body accepted by the submission endpoint.
#[derive(Debug, Serialize)]
struct Submission<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a Map<String, Value>>,
    level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

impl<'a> From<&'a LogRecord> for Submission<'a> {
    fn from(record: &'a LogRecord) -> Self {
        Self {
            message: &record.message,
            error: record.error.as_ref(),
            context: record.context.as_ref(),
            level: record.level,
            url: record.request.as_ref().map(|r| r.url.as_str()),
        }
    }
}

/// Submits records to a server's log endpoint for processes without file
/// access.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: HttpClient,
    endpoint: Url,
}

impl HttpSink {
    /// Creates a sink that posts to `<base_url>/api/log-error`.
    pub fn new(client: HttpClient, base_url: &Url) -> Result<Self> {
        let endpoint = base_url.join(LOG_ENDPOINT_PATH)?;
        Ok(Self { client, endpoint })
    }

    /// Returns the submission endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn submit(&self, record: &LogRecord) -> Result<()> {
        self.client
            .post_json(&self.endpoint, &Submission::from(record))
            .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            record_id = %record.id,
            endpoint = %self.endpoint,
            "Submitted log record"
        );

        Ok(())
    }
}

#[async_trait::async_trait]
impl LogSink for HttpSink {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn write(&self, record: &LogRecord) -> beacon_core::Result<()> {
        self.submit(record).await.map_err(Into::into)
    }
}
