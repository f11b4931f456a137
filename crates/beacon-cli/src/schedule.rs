//! Periodic health checks.
//!
//! Keeps the uptime ledger filled while nobody polls `/api/health`.

use std::time::Duration;

use beacon_health::{HealthAggregator, HealthStatus};
use beacon_logger::LogDispatcher;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Tracing target for scheduled health checks.
const TRACING_TARGET: &str = "beacon_cli::schedule";

/// Runs the health aggregator on a fixed period.
#[derive(Debug, Clone)]
pub struct HealthSchedule {
    aggregator: HealthAggregator,
    dispatcher: LogDispatcher,
    period: Option<Duration>,
}

impl HealthSchedule {
    /// Creates a schedule; a `None` period disables it.
    pub fn new(
        aggregator: HealthAggregator,
        dispatcher: LogDispatcher,
        period: Option<Duration>,
    ) -> Self {
        Self {
            aggregator,
            dispatcher,
            period,
        }
    }

    /// Spawns the schedule as a background task.
    ///
    /// The first run happens immediately. Returns `None` when disabled.
    pub fn spawn(self, cancel_token: CancellationToken) -> Option<JoinHandle<()>> {
        let Some(period) = self.period else {
            tracing::info!(target: TRACING_TARGET, "Scheduled health checks disabled");
            return None;
        };

        Some(tokio::spawn(self.run(period, cancel_token)))
    }

    async fn run(self, period: Duration, cancel_token: CancellationToken) {
        tracing::info!(
            target: TRACING_TARGET,
            period_secs = period.as_secs(),
            "Starting scheduled health checks"
        );

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = cancel_token.cancelled() => {
                    tracing::info!(
                        target: TRACING_TARGET,
                        "Shutdown requested, stopping scheduled health checks"
                    );
                    break;
                }

                _ = interval.tick() => self.check_once().await,
            }
        }
    }

    async fn check_once(&self) {
        let snapshot = self.aggregator.run().await;
        if snapshot.overall != HealthStatus::Unhealthy {
            return;
        }

        let failing: Vec<Value> = snapshot
            .checks
            .iter()
            .filter(|check| check.status == HealthStatus::Unhealthy)
            .map(|check| Value::from(check.name.clone()))
            .collect();

        let mut context = Map::new();
        context.insert("failing".to_owned(), Value::Array(failing));
        context.insert("source".to_owned(), Value::from("schedule"));
        self.dispatcher
            .warn("Scheduled health check reported unhealthy", Some(context))
            .await;
    }
}
