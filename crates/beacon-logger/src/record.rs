//! Persisted log record types.

use std::error::Error as StdError;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use uuid::Uuid;

/// Severity of a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// A failure.
    #[default]
    Error,
    /// Something unexpected that did not fail the operation.
    Warn,
    /// Informational.
    Info,
}

/// Name, message and stack text of the error that caused a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSnapshot {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorSnapshot {
    /// Creates a snapshot without stack text.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Sets the stack text.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Captures an arbitrary error; the chain of sources becomes the stack.
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        let mut lines = Vec::new();
        let mut current = error.source();
        while let Some(cause) = current {
            lines.push(format!("caused by: {cause}"));
            current = cause.source();
        }

        Self {
            name: "Error".to_owned(),
            message: error.to_string(),
            stack: (!lines.is_empty()).then(|| lines.join("\n")),
        }
    }
}

impl From<&beacon_core::Error> for ErrorSnapshot {
    fn from(error: &beacon_core::Error) -> Self {
        Self {
            name: error.kind().to_string(),
            message: error.message().to_owned(),
            stack: error.source_chain(),
        }
    }
}

/// The user on whose behalf the failing operation ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The HTTP request during which the record was produced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// One line of a log file.
///
/// Records are immutable once written; a log file is an append-only sequence
/// of records serialized as JSON, one per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// `<unix-millis>-<9 hex chars>`; unique enough to correlate, not secret.
    pub id: String,
    pub timestamp: Timestamp,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestInfo>,
}

impl LogRecord {
    /// Creates a record stamped with the current time and a fresh id.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        let timestamp = Timestamp::now();
        Self {
            id: generate_id(timestamp),
            timestamp,
            level,
            message: message.into(),
            error: None,
            context: None,
            user: None,
            request: None,
        }
    }

    /// Shorthand for an [`LogLevel::Error`] record.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// Attaches the causing error.
    pub fn with_error(mut self, error: ErrorSnapshot) -> Self {
        self.error = Some(error);
        self
    }

    /// Attaches a context map. An empty map is dropped.
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = (!context.is_empty()).then_some(context);
        self
    }

    /// Attaches user information.
    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = Some(user);
        self
    }

    /// Attaches request information.
    pub fn with_request(mut self, request: RequestInfo) -> Self {
        self.request = Some(request);
        self
    }

    /// Builds a record from an application error, carrying its context.
    pub fn from_app_error(error: &beacon_core::Error) -> Self {
        Self::error(error.message())
            .with_error(ErrorSnapshot::from(error))
            .with_context(error.context().to_map())
    }
}

fn generate_id(timestamp: Timestamp) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", timestamp.as_millisecond(), &suffix[..9])
}
