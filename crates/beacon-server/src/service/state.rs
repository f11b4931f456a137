use beacon_core::{Environment, Result};
use beacon_health::{
    ConnectivityProbe, EnvironmentProbe, FilesystemProbe, HealthAggregator, HttpConnectivity,
    MetricsRecorder, UptimeMonitor,
};
use beacon_logger::http::{HttpClient, WebhookNotifier};
use beacon_logger::{ErrorLogger, ExecutionContext, LogDispatcher};

use crate::service::{AdminToken, ServiceConfig, TRACING_TARGET};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection). Every service
/// is cheap to clone and shares its internals across clones.
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    environment: Environment,
    error_logger: ErrorLogger,
    log_dispatcher: LogDispatcher,
    health_aggregator: HealthAggregator,
    metrics_recorder: MetricsRecorder,
    uptime_monitor: UptimeMonitor,
    admin_token: AdminToken,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Registers the environment, filesystem, source-control and email
    /// probes. Nothing touches the network here.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let environment = config.app_env;
        let error_logger = ErrorLogger::new(config.logger.clone());

        let mut log_dispatcher =
            LogDispatcher::new(environment, ExecutionContext::Server(error_logger.clone()));
        if let Some(url) = &config.error_webhook_url {
            let client = HttpClient::new(config.http.clone())?;
            let notifier =
                WebhookNotifier::new(client, url.clone(), &config.service_name, environment);
            log_dispatcher = log_dispatcher.with_webhook(notifier);
        }

        let probe_client = HttpConnectivity::build_client(config.http.effective_timeout())?;
        let github = HttpConnectivity::github(
            probe_client.clone(),
            config.github_repo.as_deref(),
            config.github_token.as_deref(),
        );
        let email = HttpConnectivity::resend(probe_client, config.resend_api_key.as_deref());

        let admin_token = AdminToken::new(config.admin_token.as_deref());
        let uptime_monitor = UptimeMonitor::new();
        let health_aggregator = HealthAggregator::new(environment)
            .with_probe(EnvironmentProbe::default())
            .with_probe(FilesystemProbe::default())
            .with_probe(ConnectivityProbe::new("github", github))
            .with_probe(ConnectivityProbe::new("email", email))
            .with_uptime_monitor(uptime_monitor.clone());

        tracing::info!(
            target: TRACING_TARGET,
            environment = %environment,
            log_dir = %config.logger.log_dir.display(),
            webhook = config.error_webhook_url.is_some(),
            admin_routes = admin_token.is_configured(),
            "Service state initialized"
        );

        Ok(Self {
            environment,
            error_logger,
            log_dispatcher,
            health_aggregator,
            metrics_recorder: MetricsRecorder::new(),
            uptime_monitor,
            admin_token,
        })
    }

    /// Replaces the health aggregator, attaching the shared uptime monitor.
    pub fn with_health_aggregator(mut self, aggregator: HealthAggregator) -> Self {
        self.health_aggregator = aggregator.with_uptime_monitor(self.uptime_monitor.clone());
        self
    }

    /// Returns the deployment environment.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the file logger.
    pub fn error_logger(&self) -> &ErrorLogger {
        &self.error_logger
    }

    /// Returns the log dispatcher.
    pub fn log_dispatcher(&self) -> &LogDispatcher {
        &self.log_dispatcher
    }

    /// Returns the health aggregator.
    pub fn health_aggregator(&self) -> &HealthAggregator {
        &self.health_aggregator
    }

    /// Returns the request metrics recorder.
    pub fn metrics_recorder(&self) -> &MetricsRecorder {
        &self.metrics_recorder
    }

    /// Returns the uptime monitor.
    pub fn uptime_monitor(&self) -> &UptimeMonitor {
        &self.uptime_monitor
    }

    /// Returns the maintenance route token.
    pub fn admin_token(&self) -> &AdminToken {
        &self.admin_token
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(environment: Environment);
impl_di!(error_logger: ErrorLogger);
impl_di!(log_dispatcher: LogDispatcher);
impl_di!(health_aggregator: HealthAggregator);
impl_di!(metrics_recorder: MetricsRecorder);
impl_di!(uptime_monitor: UptimeMonitor);
impl_di!(admin_token: AdminToken);

#[cfg(test)]
mod tests {
    use beacon_health::HealthStatus;
    use beacon_logger::LoggerConfig;

    use super::*;

    #[tokio::test]
    async fn replaced_aggregator_feeds_shared_monitor() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = ServiceConfig::default()
            .with_environment(Environment::Test)
            .with_logger(LoggerConfig::new(dir.path()));

        let state = ServiceState::from_config(&config)?
            .with_health_aggregator(HealthAggregator::new(Environment::Test));

        let snapshot = state.health_aggregator().run().await;
        assert_eq!(snapshot.overall, HealthStatus::Healthy);
        assert_eq!(state.uptime_monitor().stats().total_checks, 1);
        Ok(())
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ServiceConfig::default().with_logger(LoggerConfig::new(""));
        assert!(ServiceState::from_config(&config).is_err());
    }
}
