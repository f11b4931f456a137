//! Contextual data attached to application errors.

use std::collections::HashMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where and when an [`Error`] happened.
///
/// The timestamp is always present and defaults to the moment the context was
/// created.
///
/// [`Error`]: crate::Error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    /// The component that observed the failure (e.g. `"contact-form"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// The action that was being performed (e.g. `"submit"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// The user on whose behalf the action ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// When the failure was observed.
    pub timestamp: Timestamp,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl ErrorContext {
    /// Creates an empty context stamped with the current time.
    pub fn new() -> Self {
        Self {
            component: None,
            action: None,
            user_id: None,
            timestamp: Timestamp::now(),
            metadata: HashMap::new(),
        }
    }

    /// Sets the component name.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Sets the action name.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the user identifier.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Overrides the timestamp.
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Adds one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Flattens the context into a JSON object suitable for log records.
    pub fn to_map(&self) -> serde_json::Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_defaults_to_now() {
        let before = Timestamp::now();
        let context = ErrorContext::default();
        assert!(context.timestamp >= before);
    }

    #[test]
    fn serializes_camel_case_and_skips_empty() {
        let context = ErrorContext::new()
            .with_component("footer")
            .with_user("u-1")
            .with_metadata("attempt", 2);

        let map = context.to_map();
        assert_eq!(map["component"], "footer");
        assert_eq!(map["userId"], "u-1");
        assert_eq!(map["metadata"]["attempt"], 2);
        assert!(map.get("action").is_none());
        assert!(map.contains_key("timestamp"));
    }
}
