//! HTTP error handling with builder pattern for dynamic error responses.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use beacon_core::Environment;

use crate::handler::response::ErrorResponse;

/// The error type for HTTP handlers in the server.
///
/// Renders as `{success: false, error: {code, message, details?, timestamp}}`.
/// `details` is only filled in when explicitly attached; see
/// [`Error::from_app_error`] for the environment-aware conversion.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    code: Option<Cow<'a, str>>,
    message: Option<Cow<'a, str>>,
    details: Option<Cow<'a, str>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            code: None,
            message: None,
            details: None,
        }
    }

    /// Converts an application error, keeping its code, message and status.
    ///
    /// The source chain is attached as `details` everywhere but production.
    pub fn from_app_error(error: &beacon_core::Error, environment: Environment) -> Self {
        let converted = Self::new(ErrorKind::from_status(error.status()))
            .with_code(<&'static str>::from(error.kind()))
            .with_message(error.message().to_owned());

        match error.source_chain() {
            Some(chain) if !environment.is_production() => converted.with_details(chain),
            _ => converted,
        }
    }
}

impl<'a> Error<'a> {
    /// Overrides the machine-readable code of the kind.
    #[inline]
    pub fn with_code(self, code: impl Into<Cow<'a, str>>) -> Self {
        Self {
            code: Some(code.into()),
            ..self
        }
    }

    /// Replaces the default user-facing message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Attaches diagnostic details.
    #[inline]
    pub fn with_details(self, details: impl Into<Cow<'a, str>>) -> Self {
        Self {
            details: Some(details.into()),
            ..self
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the code sent to the client.
    #[inline]
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or(self.kind.code())
    }

    /// Returns the custom message if present.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the details if present.
    #[inline]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();

        let mut debug_struct = f.debug_struct("Error");
        debug_struct
            .field("kind", &self.kind)
            .field("code", &self.code())
            .field("status", &response.status);

        if let Some(ref message) = self.message {
            debug_struct.field("message", message);
        }

        if let Some(ref details) = self.details {
            debug_struct.field("details", details);
        }

        debug_struct.finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        let message = self.message.as_deref().unwrap_or(&response.message);

        write!(f, "{} ({}): {}", self.code(), response.status.as_u16(), message)?;

        if let Some(ref details) = self.details {
            write!(f, " - {}", details)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let mut response = self.kind.response();

        if let Some(code) = self.code {
            response = response.with_code(code);
        }

        if let Some(message) = self.message {
            response = response.with_message(message);
        }

        if let Some(details) = self.details {
            response = response.with_details(details);
        }

        response.into_response()
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A specialized [`Result`] type for HTTP operations.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Enumeration of the HTTP error kinds the server produces.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // 4xx Client Errors
    /// 400 Bad Request - Invalid request data
    BadRequest,
    /// 401 Unauthorized - Invalid credentials
    Unauthorized,
    /// 403 Forbidden - Access denied
    Forbidden,
    /// 404 Not Found - Resource not found
    NotFound,
    /// 413 Payload Too Large - Request body over the limit
    PayloadTooLarge,
    /// 429 Too Many Requests - Rate limit exceeded
    TooManyRequests,

    // 5xx Server Errors
    /// 500 Internal Server Error - Unexpected server error
    #[default]
    InternalServerError,
    /// 502 Bad Gateway - A third-party service failed
    BadGateway,
    /// 503 Service Unavailable - A dependency is unreachable
    ServiceUnavailable,
    /// 504 Gateway Timeout - The request or a dependency timed out
    GatewayTimeout,
}

impl ErrorKind {
    /// Maps a status code onto the closest kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            413 => Self::PayloadTooLarge,
            429 => Self::TooManyRequests,
            400..=499 => Self::BadRequest,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            _ => Self::InternalServerError,
        }
    }

    /// Returns the machine-readable code sent to clients.
    pub const fn code(self) -> &'static str {
        match self {
            Self::BadRequest => "VALIDATION_ERROR",
            Self::Unauthorized => "AUTHENTICATION_ERROR",
            Self::Forbidden => "AUTHORIZATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::TooManyRequests => "RATE_LIMIT_EXCEEDED",
            Self::InternalServerError => "INTERNAL_ERROR",
            Self::BadGateway => "EXTERNAL_SERVICE_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::GatewayTimeout => "TIMEOUT_ERROR",
        }
    }

    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    /// Creates an [`Error`] with the specified message.
    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error {
            kind: self,
            code: None,
            message: Some(message.into()),
            details: None,
        }
    }

    /// Creates an [`Error`] with the specified details.
    #[inline]
    pub fn with_details<'a>(self, details: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error {
            kind: self,
            code: None,
            message: None,
            details: Some(details.into()),
        }
    }

    /// Returns the HTTP status code for this error kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the default response for this error kind.
    #[inline]
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::Forbidden => ErrorResponse::FORBIDDEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::TooManyRequests => ErrorResponse::TOO_MANY_REQUESTS,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::BadGateway => ErrorResponse::BAD_GATEWAY,
            Self::ServiceUnavailable => ErrorResponse::SERVICE_UNAVAILABLE,
            Self::GatewayTimeout => ErrorResponse::GATEWAY_TIMEOUT,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use beacon_core::ErrorKind as AppErrorKind;

    use super::*;

    #[test]
    fn default_http_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.code(), "INTERNAL_ERROR");
        let _ = error.into_response();
    }

    #[test]
    fn error_with_message_and_details() {
        let error = ErrorKind::BadRequest
            .with_message("message is required")
            .with_details("field: message");

        assert_eq!(error.message(), Some("message is required"));
        assert_eq!(error.details(), Some("field: message"));
        assert_eq!(error.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorKind::from_status(400), ErrorKind::BadRequest);
        assert_eq!(ErrorKind::from_status(422), ErrorKind::BadRequest);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::TooManyRequests);
        assert_eq!(ErrorKind::from_status(502), ErrorKind::BadGateway);
        assert_eq!(ErrorKind::from_status(504), ErrorKind::GatewayTimeout);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::InternalServerError);
        assert_eq!(ErrorKind::from_status(200), ErrorKind::InternalServerError);
    }

    #[test]
    fn app_error_keeps_code_and_status() {
        let app = beacon_core::Error::github_api("rate limited", 429);
        let error = Error::from_app_error(&app, Environment::Development);

        assert_eq!(error.kind(), ErrorKind::TooManyRequests);
        assert_eq!(error.code(), AppErrorKind::GithubApiError.as_ref());
        assert_eq!(error.message(), Some("rate limited"));
    }

    #[test]
    fn details_hidden_in_production() {
        let app = beacon_core::Error::internal("boom")
            .with_source(std::io::Error::other("disk on fire"));

        let development = Error::from_app_error(&app, Environment::Development);
        let production = Error::from_app_error(&app, Environment::Production);

        assert!(development.details().unwrap().contains("disk on fire"));
        assert!(production.details().is_none());
    }

    #[test]
    fn std_fmt_display() {
        let error = ErrorKind::NotFound
            .with_message("Resource not found")
            .with_details("path: /missing");

        let display = format!("{}", error);
        assert!(display.contains("NOT_FOUND"));
        assert!(display.contains("404"));
        assert!(display.contains("Resource not found"));
        assert!(display.contains("path: /missing"));
    }
}
