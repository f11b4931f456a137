//! Deployment environment tag.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// The mode the service runs in.
///
/// Controls where log records go and how much detail error responses carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development: records are mirrored to the console.
    #[default]
    Development,
    /// Production: records are persisted and forwarded.
    Production,
    /// Automated tests: records are dropped.
    Test,
}

impl Environment {
    /// Returns true for [`Environment::Development`].
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Returns true for [`Environment::Production`].
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Environment::from_str("Production").unwrap(), Environment::Production);
        assert_eq!(Environment::from_str("test").unwrap(), Environment::Test);
        assert!(Environment::from_str("staging").is_err());
    }

    #[test]
    fn displays_lowercase() {
        assert_eq!(Environment::Development.to_string(), "development");
        assert!(Environment::default().is_development());
    }
}
