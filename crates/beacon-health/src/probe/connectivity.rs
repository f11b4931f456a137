//! Probe adapter for external dependencies that test their own reachability.

use std::sync::Arc;

use super::{HealthProbe, timed};
use crate::{HealthCheck, TRACING_TARGET_PROBE};

/// An external dependency that can test its own reachability.
///
/// Implementations return an error describing why the dependency is not
/// usable, including when it is not configured at all.
#[async_trait::async_trait]
pub trait Connectivity: Send + Sync {
    /// Performs a lightweight request against the dependency.
    async fn test_connection(&self) -> beacon_core::Result<()>;
}

/// Adapts a [`Connectivity`] into a [`HealthProbe`].
#[derive(Clone)]
pub struct ConnectivityProbe {
    name: String,
    target: Arc<dyn Connectivity>,
}

impl std::fmt::Debug for ConnectivityProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityProbe")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ConnectivityProbe {
    /// Creates a probe named `name` for `target`.
    pub fn new(name: impl Into<String>, target: impl Connectivity + 'static) -> Self {
        Self {
            name: name.into(),
            target: Arc::new(target),
        }
    }
}

#[async_trait::async_trait]
impl HealthProbe for ConnectivityProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> HealthCheck {
        let (result, elapsed) = timed(self.target.test_connection()).await;

        let check = match result {
            Ok(()) => HealthCheck::healthy(&self.name).with_message("Connection successful"),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_PROBE,
                    probe = %self.name,
                    code = error.classification_code(),
                    error = %error,
                    "Connectivity probe failed"
                );
                HealthCheck::unhealthy(&self.name, error.message())
                    .with_detail("code", error.classification_code())
                    .with_detail("status", error.status())
            }
        };

        check.with_response_time(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use beacon_core::Error;

    use super::*;
    use crate::HealthStatus;

    struct Reachable;

    #[async_trait::async_trait]
    impl Connectivity for Reachable {
        async fn test_connection(&self) -> beacon_core::Result<()> {
            tokio::time::sleep(Duration::from_millis(25)).await;
            Ok(())
        }
    }

    struct Unconfigured;

    #[async_trait::async_trait]
    impl Connectivity for Unconfigured {
        async fn test_connection(&self) -> beacon_core::Result<()> {
            Err(Error::configuration("GITHUB_TOKEN not configured"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reachable_dependency_is_healthy_with_timing() {
        let check = ConnectivityProbe::new("github", Reachable).check().await;

        assert_eq!(check.name, "github");
        assert_eq!(check.status, HealthStatus::Healthy);
        assert!(check.response_time >= 25);
    }

    #[tokio::test]
    async fn failure_reports_dependency_error() {
        let check = ConnectivityProbe::new("github", Unconfigured).check().await;

        assert_eq!(check.status, HealthStatus::Unhealthy);
        assert_eq!(check.message.as_deref(), Some("GITHUB_TOKEN not configured"));
        assert_eq!(check.details.unwrap()["code"], "CONFIGURATION_ERROR");
    }
}
