//! Health status types.

use std::time::Duration;

use beacon_core::Environment;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Outcome of a single check or of the whole system.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Operating normally.
    #[default]
    Healthy,
    /// Working, but something optional is missing or slow.
    Degraded,
    /// Not operational.
    Unhealthy,
}

impl HealthStatus {
    /// Folds statuses: any unhealthy wins, then any degraded, else healthy.
    ///
    /// The result does not depend on order. An empty input is healthy.
    pub fn reduce<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        statuses
            .into_iter()
            .fold(Self::Healthy, |acc, status| match (acc, status) {
                (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
                (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
                _ => Self::Healthy,
            })
    }

    /// Returns true unless the status is [`HealthStatus::Unhealthy`].
    #[must_use]
    pub const fn is_operational(self) -> bool {
        !matches!(self, Self::Unhealthy)
    }
}

/// The outcome of probing one dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Wall-clock time the probe took, in milliseconds.
    pub response_time: u64,
    pub last_checked: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl HealthCheck {
    /// Creates a check with the given status and no message.
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            message: None,
            response_time: 0,
            last_checked: Timestamp::now(),
            details: None,
        }
    }

    /// Creates a healthy check.
    pub fn healthy(name: impl Into<String>) -> Self {
        Self::new(name, HealthStatus::Healthy)
    }

    /// Creates a degraded check.
    pub fn degraded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, HealthStatus::Degraded).with_message(message)
    }

    /// Creates an unhealthy check.
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, HealthStatus::Unhealthy).with_message(message)
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the measured response time.
    pub fn with_response_time(mut self, elapsed: Duration) -> Self {
        self.response_time = elapsed.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Adds one detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Aggregate snapshot produced by one run of the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub overall: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: Timestamp,
    /// Process uptime in seconds.
    pub uptime: u64,
    pub version: String,
    pub environment: Environment,
}

impl SystemHealth {
    /// Returns true when the overall status is not unhealthy.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.overall.is_operational()
    }
}
