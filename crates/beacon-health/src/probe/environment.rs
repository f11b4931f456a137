//! Presence check for required and optional configuration variables.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use super::HealthProbe;
use crate::HealthCheck;

/// Variables without which the site cannot serve authenticated pages.
pub const REQUIRED_VARIABLES: [&str; 4] = [
    "AUTH_SECRET",
    "GITHUB_CLIENT_ID",
    "GITHUB_CLIENT_SECRET",
    "ADMIN_EMAILS",
];

/// Integration keys whose absence only disables a feature.
pub const OPTIONAL_VARIABLES: [&str; 4] =
    ["GITHUB_TOKEN", "GITHUB_REPO", "RESEND_API_KEY", "FROM_EMAIL"];

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Checks that configuration variables are present.
///
/// Unhealthy when a required variable is missing, degraded when only
/// optional ones are, healthy otherwise. An empty value counts as missing.
#[derive(Clone)]
pub struct EnvironmentProbe {
    required: Vec<String>,
    optional: Vec<String>,
    lookup: Lookup,
}

impl fmt::Debug for EnvironmentProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentProbe")
            .field("required", &self.required)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

impl Default for EnvironmentProbe {
    fn default() -> Self {
        Self::new(REQUIRED_VARIABLES, OPTIONAL_VARIABLES)
    }
}

impl EnvironmentProbe {
    /// Creates a probe over the given variable names, reading the process
    /// environment.
    pub fn new<R, O>(required: R, optional: O) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            optional: optional.into_iter().map(Into::into).collect(),
            lookup: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replaces the variable source.
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Arc::new(lookup);
        self
    }

    fn presence(&self, names: &[String]) -> (Map<String, Value>, Vec<String>) {
        let mut presence = Map::new();
        let mut missing = Vec::new();

        for name in names {
            let present = (self.lookup)(name).is_some_and(|v| !v.is_empty());
            presence.insert(name.clone(), Value::Bool(present));
            if !present {
                missing.push(name.clone());
            }
        }

        (presence, missing)
    }
}

#[async_trait::async_trait]
impl HealthProbe for EnvironmentProbe {
    fn name(&self) -> &str {
        "environment"
    }

    async fn check(&self) -> HealthCheck {
        let started = Instant::now();
        let (required, missing_required) = self.presence(&self.required);
        let (optional, missing_optional) = self.presence(&self.optional);

        let check = if !missing_required.is_empty() {
            HealthCheck::unhealthy(
                self.name(),
                format!(
                    "Missing required environment variables: {}",
                    missing_required.join(", ")
                ),
            )
        } else if !missing_optional.is_empty() {
            HealthCheck::degraded(
                self.name(),
                format!(
                    "Missing optional environment variables: {}",
                    missing_optional.join(", ")
                ),
            )
        } else {
            HealthCheck::healthy(self.name())
                .with_message("All environment variables are configured")
        };

        check
            .with_detail("required", required)
            .with_detail("optional", optional)
            .with_response_time(started.elapsed())
    }
}
