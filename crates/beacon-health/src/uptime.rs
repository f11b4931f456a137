//! Rolling availability ledger.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jiff::Timestamp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Number of outcomes kept in the ledger.
pub const LEDGER_CAPACITY: usize = 100;

/// Number of most recent outcomes availability is computed over.
pub const AVAILABILITY_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy)]
struct UptimeEntry {
    healthy: bool,
    at: Timestamp,
}

/// Availability and process uptime at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeStats {
    /// Percentage of healthy outcomes in the window, two decimals.
    pub availability: f64,
    /// Human-readable uptime, e.g. `3d 4h`.
    pub uptime: String,
    pub uptime_seconds: u64,
    /// Number of outcomes currently in the ledger.
    pub total_checks: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check: Option<Timestamp>,
}

/// Bounded ring of health-check outcomes.
///
/// Cloning shares the ledger.
#[derive(Debug, Clone)]
pub struct UptimeMonitor {
    entries: Arc<Mutex<VecDeque<UptimeEntry>>>,
    started_at: Instant,
}

impl Default for UptimeMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeMonitor {
    /// Creates an empty ledger; uptime counts from now.
    pub fn new() -> Self {
        Self::with_started_at(Instant::now())
    }

    /// Creates an empty ledger counting uptime from `started_at`.
    pub fn with_started_at(started_at: Instant) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(LEDGER_CAPACITY))),
            started_at,
        }
    }

    /// Appends one outcome, evicting the oldest beyond capacity.
    pub fn record_check(&self, healthy: bool) {
        let mut entries = self.entries.lock();
        if entries.len() == LEDGER_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(UptimeEntry {
            healthy,
            at: Timestamp::now(),
        });
    }

    /// Computes availability over the latest outcomes and the current uptime.
    ///
    /// With no recorded outcomes availability is `100.0`.
    pub fn stats(&self) -> UptimeStats {
        let (availability, total_checks, last_check) = {
            let entries = self.entries.lock();
            let window = entries.len().min(AVAILABILITY_WINDOW);
            let healthy = entries.iter().rev().take(window).filter(|e| e.healthy).count();
            let availability = if window == 0 {
                100.0
            } else {
                round2(healthy as f64 * 100.0 / window as f64)
            };
            (availability, entries.len(), entries.back().map(|e| e.at))
        };

        let uptime = self.started_at.elapsed();
        UptimeStats {
            availability,
            uptime: format_uptime(uptime),
            uptime_seconds: uptime.as_secs(),
            total_checks,
            last_check,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a duration with its two most significant units.
///
/// `93784s` becomes `1d 2h`, `3725s` becomes `1h 2m`, `42s` stays `42s`.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let units = [
        (total / 86_400, "d"),
        (total % 86_400 / 3_600, "h"),
        (total % 3_600 / 60, "m"),
        (total % 60, "s"),
    ];

    let first = units.iter().position(|(value, _)| *value > 0).unwrap_or(3);
    units[first..]
        .iter()
        .take(2)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_over_latest_window() {
        let monitor = UptimeMonitor::new();
        // Older outcomes outside the window must not count.
        for _ in 0..30 {
            monitor.record_check(false);
        }
        for i in 0..20 {
            monitor.record_check(i % 4 != 0);
        }

        let stats = monitor.stats();
        assert_eq!(stats.availability, 75.0);
        assert_eq!(stats.total_checks, 50);
    }

    #[test]
    fn partial_window_and_rounding() {
        let monitor = UptimeMonitor::new();
        monitor.record_check(true);
        monitor.record_check(true);
        monitor.record_check(false);

        assert_eq!(monitor.stats().availability, 66.67);
    }

    #[test]
    fn empty_ledger_is_fully_available() {
        let stats = UptimeMonitor::new().stats();
        assert_eq!(stats.availability, 100.0);
        assert!(stats.last_check.is_none());
    }

    #[test]
    fn ring_is_bounded() {
        let monitor = UptimeMonitor::new();
        for _ in 0..(LEDGER_CAPACITY + 25) {
            monitor.record_check(true);
        }
        assert_eq!(monitor.stats().total_checks, LEDGER_CAPACITY);
    }

    #[test]
    fn clones_share_the_ledger() {
        let monitor = UptimeMonitor::new();
        monitor.clone().record_check(false);
        assert_eq!(monitor.stats().availability, 0.0);
    }

    #[test]
    fn uptime_shows_two_units() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0s");
        assert_eq!(format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3_725)), "1h 2m");
        assert_eq!(format_uptime(Duration::from_secs(93_784)), "1d 2h");
        assert_eq!(format_uptime(Duration::from_secs(86_400)), "1d 0h");
    }
}
