//! Structured application errors with classification and context tracking.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::io;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::ErrorContext;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of application failures.
///
/// The serialized form (`VALIDATION_ERROR`, `NOT_FOUND`, ...) is the error code
/// exposed in API error bodies and log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input validation failed, or an unknown error was normalized.
    ValidationError,
    /// Authentication failed.
    AuthenticationError,
    /// Authorization failed.
    AuthorizationError,
    /// Resource not found.
    NotFound,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Network-related error occurred.
    NetworkError,
    /// Timeout occurred.
    TimeoutError,
    /// A third-party service failed.
    ExternalServiceError,
    /// The source-control API failed.
    GithubApiError,
    /// The email provider failed.
    EmailServiceError,
    /// Local file system failure.
    FileSystemError,
    /// Missing or invalid configuration.
    ConfigurationError,
    /// Internal error.
    #[default]
    InternalError,
}

impl ErrorKind {
    /// Returns the HTTP status code used when no explicit status is given.
    #[must_use]
    pub const fn default_status(self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::AuthenticationError => 401,
            Self::AuthorizationError => 403,
            Self::NotFound => 404,
            Self::RateLimitExceeded => 429,
            Self::ExternalServiceError | Self::GithubApiError | Self::EmailServiceError => 502,
            Self::NetworkError => 503,
            Self::TimeoutError => 504,
            Self::FileSystemError | Self::ConfigurationError | Self::InternalError => 500,
        }
    }

    /// Check if this error kind is typically retryable.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NetworkError
                | Self::TimeoutError
                | Self::RateLimitExceeded
                | Self::ExternalServiceError
                | Self::GithubApiError
                | Self::EmailServiceError
        )
    }
}

/// An application failure with classification metadata.
///
/// Errors are assembled once through the `with_*` builder methods and are read
/// through accessors afterwards.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    status: u16,
    code: Option<Cow<'static, str>>,
    context: ErrorContext,
    retryable: bool,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error of the given kind with the kind's default status
    /// and retryability.
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: kind.default_status(),
            code: None,
            context: ErrorContext::new(),
            retryable: kind.is_retryable(),
            source: None,
        }
    }

    /// Normalizes a foreign error into a validation error with status 500.
    ///
    /// The foreign error's message becomes the message and the error itself is
    /// kept as the source.
    pub fn wrap(source: impl Into<BoxedError>) -> Self {
        let source = source.into();
        Self::new(ErrorKind::ValidationError, source.to_string())
            .with_status(500)
            .with_retryable(false)
            .with_source(source)
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::AuthenticationError, message)
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a new network error.
    pub fn network(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::TimeoutError, message)
    }

    /// Creates a new external service error.
    pub fn external_service(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ExternalServiceError, message)
    }

    /// Creates a new source-control API error carrying the upstream status.
    pub fn github_api(message: impl Into<Cow<'static, str>>, status: u16) -> Self {
        Self::new(ErrorKind::GithubApiError, message)
            .with_status(status)
            .with_retryable(status >= 500 || status == 429)
    }

    /// Creates a new email provider error.
    pub fn email_service(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::EmailServiceError, message)
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ConfigurationError, message)
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    /// Overrides the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Attaches a low-level code such as `ECONNRESET`.
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Replaces the context.
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    /// Overrides the retryability flag.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP-like status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the low-level code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the code used for classification: the low-level code when one
    /// is attached, the kind code otherwise.
    #[must_use]
    pub fn classification_code(&self) -> &str {
        self.code.as_deref().unwrap_or_else(|| self.kind.as_ref())
    }

    /// Returns the context.
    #[must_use]
    pub const fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Check if this error is flagged as retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Renders the chain of underlying causes, one per line, or `None` when
    /// the error has no source.
    #[must_use]
    pub fn source_chain(&self) -> Option<String> {
        let mut current = self.source.as_deref().map(|e| e as &(dyn StdError + 'static));
        let mut lines = Vec::new();
        while let Some(error) = current {
            lines.push(format!("caused by: {error}"));
            current = error.source();
        }

        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

/// Maps an I/O error kind to the conventional errno-style code.
pub(crate) fn io_error_code(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::ConnectionReset => Some("ECONNRESET"),
        io::ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
        io::ErrorKind::ConnectionAborted => Some("ECONNABORTED"),
        io::ErrorKind::TimedOut => Some("ETIMEDOUT"),
        io::ErrorKind::NotFound => Some("ENOENT"),
        io::ErrorKind::PermissionDenied => Some("EACCES"),
        io::ErrorKind::AlreadyExists => Some("EEXIST"),
        io::ErrorKind::BrokenPipe => Some("EPIPE"),
        _ => None,
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        let kind = match error.kind() {
            io::ErrorKind::TimedOut => ErrorKind::TimeoutError,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => ErrorKind::NetworkError,
            _ => ErrorKind::FileSystemError,
        };

        let mut converted = Self::new(kind, error.to_string());
        if let Some(code) = io_error_code(error.kind()) {
            converted = converted.with_code(code);
        }

        converted.with_source(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::validation(format!("Invalid JSON: {error}")).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn new_uses_kind_defaults() {
        let error = Error::new(ErrorKind::NotFound, "page missing");
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.status(), 404);
        assert!(!error.is_retryable());
        assert_eq!(error.message(), "page missing");
    }

    #[test]
    fn builder_overrides() {
        let error = Error::network("socket closed")
            .with_status(503)
            .with_code("ECONNRESET")
            .with_context(ErrorContext::new().with_component("vlogs"));

        assert!(error.is_retryable());
        assert_eq!(error.code(), Some("ECONNRESET"));
        assert_eq!(error.classification_code(), "ECONNRESET");
        assert_eq!(error.context().component.as_deref(), Some("vlogs"));
    }

    #[test]
    fn classification_code_falls_back_to_kind() {
        let error = Error::timeout("slow");
        assert_eq!(error.classification_code(), "TIMEOUT_ERROR");
    }

    #[test]
    fn wrap_normalizes_foreign_errors() {
        let error = Error::wrap(io::Error::other("boom"));
        assert_eq!(error.kind(), ErrorKind::ValidationError);
        assert_eq!(error.status(), 500);
        assert_eq!(error.message(), "boom");
        assert!(error.source_chain().unwrap().contains("boom"));
    }

    #[test]
    fn display_includes_code_and_message() {
        let error = Error::internal("broken");
        assert_eq!(error.to_string(), "[INTERNAL_ERROR] broken");
    }

    #[test]
    fn from_io_maps_codes() {
        let reset = Error::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(reset.kind(), ErrorKind::NetworkError);
        assert_eq!(reset.code(), Some("ECONNRESET"));

        let timeout = Error::from(io::Error::new(io::ErrorKind::TimedOut, "late"));
        assert_eq!(timeout.kind(), ErrorKind::TimeoutError);
        assert_eq!(timeout.code(), Some("ETIMEDOUT"));

        let missing = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(missing.kind(), ErrorKind::FileSystemError);
        assert_eq!(missing.code(), Some("ENOENT"));
    }

    #[test]
    fn github_retryability_follows_status() {
        assert!(Error::github_api("upstream", 502).is_retryable());
        assert!(Error::github_api("limited", 429).is_retryable());
        assert!(!Error::github_api("bad token", 401).is_retryable());
    }

    #[test]
    fn kind_codes_round_trip_through_strum() {
        assert_eq!(ErrorKind::GithubApiError.as_ref(), "GITHUB_API_ERROR");
        assert_eq!(
            ErrorKind::from_str("RATE_LIMIT_EXCEEDED").unwrap(),
            ErrorKind::RateLimitExceeded
        );
        assert_eq!(ErrorKind::default(), ErrorKind::InternalError);
    }

    #[test]
    fn source_chain_is_none_without_source() {
        assert!(Error::internal("plain").source_chain().is_none());
    }
}
