//! Reqwest-based log transports.
//!
//! [`HttpSink`] submits records to a server's `/api/log-error` endpoint and
//! [`WebhookNotifier`] forwards them to an external collector.
//!
//! # Example
//!
//! ```rust,ignore
//! use beacon_logger::http::{HttpClient, HttpConfig, HttpSink};
//!
//! let client = HttpClient::new(HttpConfig::default())?;
//! let sink = HttpSink::new(client, &"https://example.org".parse()?)?;
//! ```

mod client;
mod config;
mod error;
mod sink;
#[cfg(test)]
pub(crate) mod testing;
mod webhook;

pub use client::HttpClient;
pub use config::HttpConfig;
pub use error::{Error, Result};
pub use sink::{HttpSink, LOG_ENDPOINT_PATH};
pub use webhook::WebhookNotifier;

/// Tracing target for HTTP log transports.
pub const TRACING_TARGET: &str = "beacon_logger::http";
