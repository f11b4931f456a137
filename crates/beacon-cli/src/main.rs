#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod schedule;
mod server;

use std::process;

use anyhow::Context;
use beacon_server::handler;
use beacon_server::service::ServiceState;
use tokio_util::sync::CancellationToken;

use crate::config::Cli;
use crate::schedule::HealthSchedule;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "beacon_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "beacon_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "beacon_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing()?;
    cli.log();
    cli.validate().context("invalid configuration")?;

    let state = ServiceState::from_config(&cli.service)
        .context("failed to create service state")?;

    let shutdown = CancellationToken::new();
    let schedule = HealthSchedule::new(
        state.health_aggregator().clone(),
        state.log_dispatcher().clone(),
        cli.health_interval(),
    )
    .spawn(shutdown.clone());

    let router = handler::app(state, &cli.recovery);
    let served = server::serve(router, cli.server, shutdown.clone()).await;

    shutdown.cancel();
    if let Some(handle) = schedule
        && let Err(err) = handle.await
    {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            "health schedule did not stop cleanly"
        );
    }

    served.context("server terminated abnormally")
}
