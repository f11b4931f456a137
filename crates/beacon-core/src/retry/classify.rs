//! Retryability classification.

use std::borrow::Cow;
use std::io;

use crate::Error;
use crate::error::io_error_code;

/// Message substrings that mark a failure as transient when no explicit
/// patterns are configured. Matched case-sensitively.
const DEFAULT_MESSAGE_MARKERS: [&str; 4] = ["timeout", "network", "ECONNRESET", "ENOTFOUND"];

/// Classification codes that mark a failure as transient when no explicit
/// patterns are configured.
const DEFAULT_RETRYABLE_CODES: [&str; 2] = ["ECONNRESET", "ETIMEDOUT"];

/// Exposes the attributes the retry executor inspects on a failure.
pub trait Classify {
    /// Human-readable failure message.
    fn message(&self) -> Cow<'_, str>;

    /// Classification code such as `ECONNRESET` or `NETWORK_ERROR`.
    fn classification_code(&self) -> Option<&str>;

    /// Attached HTTP-like status, if any.
    fn status(&self) -> Option<u16> {
        None
    }
}

impl Classify for Error {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(Error::message(self))
    }

    fn classification_code(&self) -> Option<&str> {
        Some(Error::classification_code(self))
    }

    fn status(&self) -> Option<u16> {
        Some(Error::status(self))
    }
}

impl Classify for io::Error {
    fn message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn classification_code(&self) -> Option<&str> {
        io_error_code(self.kind())
    }
}

/// Decides whether `error` is worth another attempt.
///
/// With `patterns`, the error is retryable when its message contains one of
/// them (case-insensitive) or its classification code equals one. Without
/// patterns the default heuristic applies: transient message markers,
/// transient codes, or a status of 500 and above.
pub fn is_retryable<E>(error: &E, patterns: Option<&[String]>) -> bool
where
    E: Classify + ?Sized,
{
    let message = error.message();
    let code = error.classification_code();

    if let Some(patterns) = patterns.filter(|p| !p.is_empty()) {
        let lowered = message.to_lowercase();
        return patterns.iter().any(|pattern| {
            lowered.contains(&pattern.to_lowercase()) || code == Some(pattern.as_str())
        });
    }

    DEFAULT_MESSAGE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
        || code.is_some_and(|code| DEFAULT_RETRYABLE_CODES.contains(&code))
        || error.status().is_some_and(|status| status >= 500)
}
