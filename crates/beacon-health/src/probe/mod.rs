//! Health probes.
//!
//! A probe never fails: every problem it runs into is reported as an
//! unhealthy [`HealthCheck`] so that one broken dependency cannot abort the
//! aggregator's fan-out.

mod connectivity;
mod environment;
mod filesystem;
#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
mod http;

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

pub use connectivity::{Connectivity, ConnectivityProbe};
pub use environment::{EnvironmentProbe, OPTIONAL_VARIABLES, REQUIRED_VARIABLES};
pub use filesystem::FilesystemProbe;
#[cfg(feature = "reqwest")]
pub use http::HttpConnectivity;

use crate::HealthCheck;

/// A single dependency check run by the aggregator.
#[async_trait::async_trait]
pub trait HealthProbe: Send + Sync {
    /// Name reported in the resulting [`HealthCheck`].
    fn name(&self) -> &str;

    /// Runs the check, stamping its own response time.
    async fn check(&self) -> HealthCheck;
}

/// Awaits `future` and returns its output with the elapsed wall-clock time.
pub(crate) async fn timed<F>(future: F) -> (F::Output, Duration)
where
    F: Future,
{
    let started = Instant::now();
    let output = future.await;
    (output, started.elapsed())
}
