//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig       # Host, port, shutdown
//! ├── recovery: RecoveryConfig   # Request timeout
//! ├── service: ServiceConfig     # Environment, log directory, webhook, probes, admin token
//! ├── log_level                  # Fallback tracing filter
//! └── health_interval            # Scheduled health checks
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! beacon --app-env production --log-dir /var/log/beacon --port 8080
//!
//! # Or via environment variables
//! APP_ENV=production LOG_DIR=/var/log/beacon PORT=8080 beacon
//! ```

mod server;

use std::process;
use std::time::Duration;

use anyhow::{Context, anyhow};
use beacon_server::middleware::RecoveryConfig;
use beacon_server::service::ServiceConfig;
use clap::Parser;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Longest accepted request timeout, in seconds.
const MAX_REQUEST_TIMEOUT: u64 = 300;

/// Complete CLI configuration.
///
/// Combines all configuration groups for the beacon server:
/// - [`ServerConfig`]: Network binding and shutdown
/// - [`RecoveryConfig`]: Request timeout
/// - [`ServiceConfig`]: Environment, logging, webhook, probe and admin credentials
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "beacon")]
#[command(about = "Error logging, health and metrics service")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// Recovery middleware configuration.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,

    /// Service configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Seconds between scheduled health checks; 0 disables them.
    #[arg(long, env = "HEALTH_INTERVAL", default_value_t = 60)]
    pub health_interval: u64,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is read before clap parses arguments so its values act
    /// as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing.
    ///
    /// `RUST_LOG` wins over `--log-level`. Production emits JSON lines.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let filter = self.env_filter()?;

        let (json, pretty) = if self.service.app_env.is_production() {
            (Some(fmt::layer().json().with_target(true)), None)
        } else {
            (None, Some(fmt::layer().with_target(true).with_ansi(true)))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(json)
            .with(pretty)
            .try_init()
            .map_err(|e| anyhow!("failed to initialize tracing: {e}"))
    }

    fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .with_context(|| format!("invalid log level '{}'", self.log_level))
    }

    /// Returns the scheduled health-check period, `None` when disabled.
    pub fn health_interval(&self) -> Option<Duration> {
        (self.health_interval > 0).then(|| Duration::from_secs(self.health_interval))
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;

        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and {MAX_REQUEST_TIMEOUT} seconds."
            ));
        }

        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            "starting beacon server"
        );

        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );

        self.server.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            environment = %self.service.app_env,
            service_name = %self.service.service_name,
            log_dir = %self.service.logger.log_dir.display(),
            log_max_file_size = self.service.logger.max_file_size,
            log_max_files = self.service.logger.max_files,
            webhook = self.service.error_webhook_url.is_some(),
            admin_routes = self.service.admin_token.is_some(),
            request_timeout_secs = self.recovery.request_timeout,
            health_interval_secs = self.health_interval,
            "service configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
