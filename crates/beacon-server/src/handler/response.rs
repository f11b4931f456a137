//! Response bodies shared by the handlers.

use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// HTTP error response representation.
///
/// Serialized inside the `{success: false, error: ...}` envelope together
/// with the time the response was produced.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// Machine-readable error code.
    pub code: Cow<'a, str>,
    /// User-friendly error message safe for client display.
    pub message: Cow<'a, str>,
    /// Diagnostic details, never set in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "VALIDATION_ERROR",
        "The request could not be processed due to invalid data",
        StatusCode::BAD_REQUEST,
    );
    pub const FORBIDDEN: Self = Self::new(
        "AUTHORIZATION_ERROR",
        "You don't have permission to access this resource",
        StatusCode::FORBIDDEN,
    );
    pub const NOT_FOUND: Self = Self::new(
        "NOT_FOUND",
        "The requested resource was not found",
        StatusCode::NOT_FOUND,
    );
    pub const PAYLOAD_TOO_LARGE: Self = Self::new(
        "PAYLOAD_TOO_LARGE",
        "The request body is too large",
        StatusCode::PAYLOAD_TOO_LARGE,
    );
    pub const TOO_MANY_REQUESTS: Self = Self::new(
        "RATE_LIMIT_EXCEEDED",
        "Too many requests. Please slow down and try again later",
        StatusCode::TOO_MANY_REQUESTS,
    );
    pub const UNAUTHORIZED: Self = Self::new(
        "AUTHENTICATION_ERROR",
        "Invalid or expired authentication credentials",
        StatusCode::UNAUTHORIZED,
    );

    // 5xx Server Errors
    pub const BAD_GATEWAY: Self = Self::new(
        "EXTERNAL_SERVICE_ERROR",
        "An upstream service failed. Please try again later",
        StatusCode::BAD_GATEWAY,
    );
    pub const GATEWAY_TIMEOUT: Self = Self::new(
        "TIMEOUT_ERROR",
        "The request took too long to process",
        StatusCode::GATEWAY_TIMEOUT,
    );
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "INTERNAL_ERROR",
        "An internal server error occurred. Please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const SERVICE_UNAVAILABLE: Self = Self::new(
        "SERVICE_UNAVAILABLE",
        "The service is temporarily unavailable",
        StatusCode::SERVICE_UNAVAILABLE,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(code: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            code: Cow::Borrowed(code),
            message: Cow::Borrowed(message),
            details: None,
            status,
        }
    }

    /// Replaces the error code.
    pub fn with_code(mut self, code: impl Into<Cow<'a, str>>) -> Self {
        self.code = code.into();
        self
    }

    /// Replaces the default message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches details. If details already exist, they are merged with a
    /// separator.
    pub fn with_details(mut self, details: impl Into<Cow<'a, str>>) -> Self {
        let new_details = details.into();
        self.details = Some(match self.details {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_details)),
            None => new_details,
        });
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    #[serde(flatten)]
    response: ErrorResponse<'a>,
    timestamp: Timestamp,
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        let status = self.status;
        let envelope = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                response: self,
                timestamp: Timestamp::now(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}

/// Acknowledgement body, `{"success": true}`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledged {
    pub success: bool,
}

impl Acknowledged {
    /// The only value this body takes.
    pub const OK: Self = Self { success: true };
}
