//! Error types for HTTP log transports.

use thiserror::Error;

/// Result type alias for HTTP transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for HTTP transport operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("endpoint responded with status {0}")]
    Status(u16),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<Error> for beacon_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    beacon_core::Error::timeout(e.to_string())
                        .with_code("ETIMEDOUT")
                        .with_source(e)
                } else if e.is_connect() {
                    beacon_core::Error::network("Connection failed").with_source(e)
                } else {
                    beacon_core::Error::network(e.to_string()).with_source(e)
                }
            }
            Error::Status(status) => {
                beacon_core::Error::external_service(format!("endpoint responded with {status}"))
                    .with_status(status)
                    .with_retryable(status >= 500 || status == 429)
            }
            Error::Serde(e) => beacon_core::Error::from(e),
            Error::Url(e) => beacon_core::Error::configuration(e.to_string()).with_source(e),
        }
    }
}
