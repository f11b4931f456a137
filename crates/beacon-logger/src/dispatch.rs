//! Environment-aware routing of log records.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::sync::Arc;

use beacon_core::Environment;
use serde_json::{Map, Value};

#[cfg(feature = "reqwest")]
use crate::http::WebhookNotifier;
use crate::{
    ErrorSnapshot, ExecutionContext, LogLevel, LogRecord, LogSink, TRACING_TARGET_CONSOLE,
    TRACING_TARGET_FALLBACK,
};

/// Routes records to the console, a [`LogSink`], and an optional webhook.
///
/// - development: every record is mirrored to the console target.
/// - production: records go to the sink chosen by the [`ExecutionContext`]
///   and, when configured, to the webhook on a detached task.
/// - test: records are dropped.
///
/// None of the methods fail; transport failures are reported on the fallback
/// tracing target.
#[derive(Debug, Clone)]
pub struct LogDispatcher {
    environment: Environment,
    sink: Arc<dyn LogSink>,
    #[cfg(feature = "reqwest")]
    webhook: Option<WebhookNotifier>,
}

impl LogDispatcher {
    /// Creates a dispatcher whose sink follows from `context`.
    pub fn new(environment: Environment, context: ExecutionContext) -> Self {
        Self::with_sink(environment, context.into_sink())
    }

    /// Creates a dispatcher with an explicit sink.
    pub fn with_sink(environment: Environment, sink: Arc<dyn LogSink>) -> Self {
        Self {
            environment,
            sink,
            #[cfg(feature = "reqwest")]
            webhook: None,
        }
    }

    /// Forwards production records to `notifier` as well.
    #[cfg(feature = "reqwest")]
    #[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
    #[must_use]
    pub fn with_webhook(mut self, notifier: WebhookNotifier) -> Self {
        self.webhook = Some(notifier);
        self
    }

    /// Returns the environment the dispatcher routes for.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Builds a record from the parts and dispatches it.
    pub async fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        error: Option<&(dyn StdError + Send + Sync + 'static)>,
        context: Option<Map<String, Value>>,
    ) {
        let mut record = LogRecord::new(level, message);
        if let Some(error) = error {
            record = record.with_error(ErrorSnapshot::from_error(error));
        }
        if let Some(context) = context {
            record = record.with_context(context);
        }

        self.dispatch(record).await;
    }

    /// Logs at error level.
    pub async fn error(
        &self,
        message: impl Into<String>,
        error: Option<&(dyn StdError + Send + Sync + 'static)>,
        context: Option<Map<String, Value>>,
    ) {
        self.log(LogLevel::Error, message, error, context).await;
    }

    /// Logs at warn level.
    pub async fn warn(&self, message: impl Into<String>, context: Option<Map<String, Value>>) {
        self.log(LogLevel::Warn, message, None, context).await;
    }

    /// Logs at info level.
    pub async fn info(&self, message: impl Into<String>, context: Option<Map<String, Value>>) {
        self.log(LogLevel::Info, message, None, context).await;
    }

    /// Logs an application error with its kind, source chain and context.
    pub async fn app_error(&self, error: &beacon_core::Error) {
        self.dispatch(LogRecord::from_app_error(error)).await;
    }

    /// Routes a prepared record.
    pub async fn dispatch(&self, record: LogRecord) {
        match self.environment {
            Environment::Test => {}
            Environment::Development => mirror_to_console(&record),
            Environment::Production => {
                #[cfg(feature = "reqwest")]
                if let Some(webhook) = &self.webhook {
                    webhook.notify(record.clone());
                }

                if let Err(error) = self.sink.write(&record).await {
                    tracing::error!(
                        target: TRACING_TARGET_FALLBACK,
                        sink = self.sink.name(),
                        record_id = %record.id,
                        message = %record.message,
                        error = %error,
                        "Failed to deliver log record"
                    );
                }
            }
        }
    }
}

/// Renders a record the way it is mirrored to the console.
pub fn format_console(record: &LogRecord) -> String {
    let mut out = format!(
        "[{}] {}: {}",
        record.timestamp,
        record.level.as_ref().to_uppercase(),
        record.message
    );

    if let Some(context) = record.context.as_ref().filter(|c| !c.is_empty()) {
        let rendered = serde_json::to_string_pretty(context).unwrap_or_default();
        let _ = write!(out, "\nContext: {rendered}");
    }

    if let Some(error) = &record.error {
        let _ = write!(out, "\nError: {}: {}", error.name, error.message);
        if let Some(stack) = &error.stack {
            let _ = write!(out, "\nStack: {stack}");
        }
    }

    out
}

fn mirror_to_console(record: &LogRecord) {
    let line = format_console(record);
    match record.level {
        LogLevel::Error => tracing::error!(target: TRACING_TARGET_CONSOLE, "{line}"),
        LogLevel::Warn => tracing::warn!(target: TRACING_TARGET_CONSOLE, "{line}"),
        LogLevel::Info => tracing::info!(target: TRACING_TARGET_CONSOLE, "{line}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use beacon_core::{Error, ErrorContext};
    use tempfile::TempDir;

    use super::*;
    use crate::{ErrorLogger, LoggerConfig};

    #[derive(Debug, Default)]
    struct FailingSink {
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LogSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn write(&self, _record: &LogRecord) -> beacon_core::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(Error::network("sink offline"))
        }
    }

    fn file_dispatcher(dir: &TempDir, environment: Environment) -> (LogDispatcher, ErrorLogger) {
        let logger = ErrorLogger::new(LoggerConfig::new(dir.path()));
        let dispatcher = LogDispatcher::new(environment, ExecutionContext::Server(logger.clone()));
        (dispatcher, logger)
    }

    #[tokio::test]
    async fn production_writes_through_sink() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let (dispatcher, logger) = file_dispatcher(&dir, Environment::Production);

        let cause = std::io::Error::other("socket closed");
        dispatcher.error("newsletter signup failed", Some(&cause), None).await;

        let records = logger.recent_logs(10).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "newsletter signup failed");
        assert_eq!(records[0].error.as_ref().unwrap().message, "socket closed");
        Ok(())
    }

    #[tokio::test]
    async fn development_only_mirrors_to_console() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let (dispatcher, logger) = file_dispatcher(&dir, Environment::Development);

        dispatcher.warn("slow render", None).await;

        assert!(logger.recent_logs(10).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_environment_drops_records() {
        let sink = Arc::new(FailingSink::default());
        let dispatcher = LogDispatcher::with_sink(Environment::Test, sink.clone());

        dispatcher.info("ignored", None).await;

        assert_eq!(sink.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sink_failures_are_swallowed() {
        let sink = Arc::new(FailingSink::default());
        let dispatcher = LogDispatcher::with_sink(Environment::Production, sink.clone());

        dispatcher.app_error(&Error::internal("render crashed")).await;

        assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn app_error_carries_context() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let (dispatcher, logger) = file_dispatcher(&dir, Environment::Production);

        let error = Error::email_service("provider rejected message")
            .with_context(ErrorContext::new().with_component("contact-form"));
        dispatcher.app_error(&error).await;

        let records = logger.recent_logs(1).await;
        let context = records[0].context.as_ref().unwrap();
        assert_eq!(context["component"], "contact-form");
        assert_eq!(records[0].error.as_ref().unwrap().name, "EMAIL_SERVICE_ERROR");
        Ok(())
    }

    #[test]
    fn console_format_includes_context_and_stack() {
        let mut context = Map::new();
        context.insert("page".into(), Value::from("/governance"));

        let record = LogRecord::error("hydration failed")
            .with_context(context)
            .with_error(ErrorSnapshot::new("TypeError", "x is undefined").with_stack("at render"));
        let line = format_console(&record);

        assert!(line.starts_with(&format!("[{}] ERROR: hydration failed", record.timestamp)));
        assert!(line.contains("\"page\": \"/governance\""));
        assert!(line.contains("Error: TypeError: x is undefined"));
        assert!(line.contains("Stack: at render"));
    }

    #[cfg(feature = "reqwest")]
    #[tokio::test]
    async fn production_forwards_to_webhook() -> anyhow::Result<()> {
        use crate::http::testing::capture_one_request;
        use crate::http::{HttpClient, HttpConfig};

        let (url, captured) = capture_one_request(200).await?;
        let notifier = WebhookNotifier::new(
            HttpClient::new(HttpConfig::default())?,
            url,
            "beacon",
            Environment::Production,
        );
        let dispatcher =
            LogDispatcher::with_sink(Environment::Production, Arc::new(FailingSink::default()))
                .with_webhook(notifier);

        dispatcher.error("webhook me", None, None).await;

        let request = captured.await?;
        assert!(request.body.contains("webhook me"));
        Ok(())
    }
}
