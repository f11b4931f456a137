#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for file logger operations.
pub const TRACING_TARGET_FILE: &str = "beacon_logger::file";

/// Tracing target for failures inside the logging subsystem itself.
pub const TRACING_TARGET_FALLBACK: &str = "beacon_logger::fallback";

/// Tracing target for records mirrored to the console in development.
pub const TRACING_TARGET_CONSOLE: &str = "beacon_logger::console";

mod config;
mod dispatch;
mod file;
mod record;
mod sink;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod http;

pub use config::{DEFAULT_LOG_DIR, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FILES, LoggerConfig};
pub use dispatch::{LogDispatcher, format_console};
pub use file::ErrorLogger;
pub use record::{ErrorSnapshot, LogLevel, LogRecord, RequestInfo, UserInfo};
pub use sink::{ExecutionContext, FileSink, LogSink};
