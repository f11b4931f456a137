//! Log transports.

use std::sync::Arc;

use beacon_core::Result;

use crate::{ErrorLogger, LogRecord};

/// A destination for production log records.
///
/// Implementations may fail; [`LogDispatcher`](crate::LogDispatcher) reports
/// the failure locally and never surfaces it to its caller.
#[async_trait::async_trait]
pub trait LogSink: Send + Sync + std::fmt::Debug {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Persists or forwards one record.
    async fn write(&self, record: &LogRecord) -> Result<()>;
}

/// Writes records straight through an [`ErrorLogger`].
#[derive(Debug, Clone)]
pub struct FileSink {
    logger: ErrorLogger,
}

impl FileSink {
    /// Creates a sink backed by `logger`.
    pub fn new(logger: ErrorLogger) -> Self {
        Self { logger }
    }

    /// Returns the underlying logger.
    pub fn logger(&self) -> &ErrorLogger {
        &self.logger
    }
}

#[async_trait::async_trait]
impl LogSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn write(&self, record: &LogRecord) -> Result<()> {
        self.logger.log_to_file(record).await;
        Ok(())
    }
}

/// Where the dispatching code runs, which decides the transport.
#[derive(Debug, Clone)]
pub enum ExecutionContext {
    /// The process can write to the log directory.
    Server(ErrorLogger),
    /// The process cannot write files and submits records over HTTP.
    #[cfg(feature = "reqwest")]
    #[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
    Client(crate::http::HttpSink),
}

impl ExecutionContext {
    /// Returns true when records are written to disk directly.
    pub fn has_file_access(&self) -> bool {
        matches!(self, Self::Server(_))
    }

    /// Turns the context into its sink.
    pub fn into_sink(self) -> Arc<dyn LogSink> {
        match self {
            Self::Server(logger) => Arc::new(FileSink::new(logger)),
            #[cfg(feature = "reqwest")]
            Self::Client(sink) => Arc::new(sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::LoggerConfig;

    #[tokio::test]
    async fn file_sink_writes_through_logger() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let logger = ErrorLogger::new(LoggerConfig::new(dir.path()));
        let context = ExecutionContext::Server(logger.clone());
        assert!(context.has_file_access());

        let sink = context.into_sink();
        assert_eq!(sink.name(), "file");
        sink.write(&LogRecord::error("via sink")).await?;

        let records = logger.recent_logs(10).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "via sink");
        Ok(())
    }
}
