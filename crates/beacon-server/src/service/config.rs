use beacon_core::{Environment, Error, Result};
use beacon_logger::LoggerConfig;
use beacon_logger::http::HttpConfig;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default values for configuration options.
mod defaults {
    /// Default service name attached to forwarded records.
    pub const SERVICE_NAME: &str = "beacon";

    pub fn service_name() -> String {
        SERVICE_NAME.to_owned()
    }
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Deployment environment: development, production or test
    #[cfg_attr(
        feature = "config",
        arg(long = "app-env", env = "APP_ENV", default_value = "development")
    )]
    #[serde(default)]
    pub app_env: Environment,

    /// Service name reported to the error webhook
    #[cfg_attr(
        feature = "config",
        arg(long = "service-name", env = "SERVICE_NAME", default_value = defaults::SERVICE_NAME)
    )]
    #[serde(default = "defaults::service_name")]
    pub service_name: String,

    /// Webhook receiving production error records
    #[cfg_attr(
        feature = "config",
        arg(long = "error-webhook-url", env = "ERROR_WEBHOOK_URL")
    )]
    #[serde(default)]
    pub error_webhook_url: Option<Url>,

    /// Token for the source-control connectivity check
    #[cfg_attr(
        feature = "config",
        arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub github_token: Option<String>,

    /// Repository (`owner/name`) read by the source-control connectivity check
    #[cfg_attr(feature = "config", arg(long = "github-repo", env = "GITHUB_REPO"))]
    #[serde(default)]
    pub github_repo: Option<String>,

    /// API key for the email provider connectivity check
    #[cfg_attr(
        feature = "config",
        arg(long = "resend-api-key", env = "RESEND_API_KEY", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub resend_api_key: Option<String>,

    /// Bearer token required by the log and metrics maintenance routes
    #[cfg_attr(
        feature = "config",
        arg(long = "admin-token", env = "ADMIN_TOKEN", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub admin_token: Option<String>,

    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub logger: LoggerConfig,

    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            app_env: Environment::default(),
            service_name: defaults::service_name(),
            error_webhook_url: None,
            github_token: None,
            github_repo: None,
            resend_api_key: None,
            admin_token: None,
            logger: LoggerConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Set the deployment environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.app_env = environment;
        self
    }

    /// Set the file logger configuration.
    pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
        self.logger = logger;
        self
    }

    /// Set the HTTP client configuration.
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Forward production records to `url`.
    pub fn with_error_webhook_url(mut self, url: Url) -> Self {
        self.error_webhook_url = Some(url);
        self
    }

    /// Guard the maintenance routes with `token`.
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(Error::configuration("service name cannot be empty"));
        }

        if let Some(url) = &self.error_webhook_url
            && !matches!(url.scheme(), "http" | "https")
        {
            return Err(Error::configuration(format!(
                "error webhook URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        self.logger.validate()
    }
}
