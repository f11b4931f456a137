//! Marker-file round trip through a scratch directory.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use super::{HealthProbe, timed};
use crate::{HealthCheck, TRACING_TARGET_PROBE};

#[derive(Debug, Serialize, Deserialize)]
struct Marker {
    probe: String,
    nonce: String,
}

/// Round-trips a marker file through a scratch directory.
///
/// Writes a small JSON file, reads and parses it back, then removes it.
/// Any failing step makes the check unhealthy and names the step.
#[derive(Debug, Clone)]
pub struct FilesystemProbe {
    dir: PathBuf,
}

impl Default for FilesystemProbe {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl FilesystemProbe {
    /// Creates a probe writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn round_trip(&self) -> Result<(), (&'static str, String)> {
        let nonce = Uuid::new_v4().simple().to_string();
        let path = self.dir.join(format!("beacon-health-{nonce}.json"));
        let marker = Marker {
            probe: "filesystem".to_owned(),
            nonce: nonce.clone(),
        };

        let bytes = serde_json::to_vec(&marker).map_err(|e| ("serialize", e.to_string()))?;
        fs::write(&path, bytes)
            .await
            .map_err(|e| ("write", e.to_string()))?;

        let result = read_back(&path, &nonce).await;
        let removed = fs::remove_file(&path).await;
        result?;
        removed.map_err(|e: io::Error| ("delete", e.to_string()))
    }
}

async fn read_back(path: &Path, nonce: &str) -> Result<(), (&'static str, String)> {
    let contents = fs::read(path).await.map_err(|e| ("read", e.to_string()))?;
    let parsed: Marker = serde_json::from_slice(&contents).map_err(|e| ("parse", e.to_string()))?;
    if parsed.probe != "filesystem" || parsed.nonce != nonce {
        return Err(("verify", "marker contents do not match".to_owned()));
    }

    Ok(())
}

#[async_trait::async_trait]
impl HealthProbe for FilesystemProbe {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn check(&self) -> HealthCheck {
        let (result, elapsed) = timed(self.round_trip()).await;

        let check = match result {
            Ok(()) => HealthCheck::healthy(self.name()).with_message("File system is writable"),
            Err((step, error)) => {
                tracing::warn!(
                    target: TRACING_TARGET_PROBE,
                    probe = self.name(),
                    step,
                    error = %error,
                    "File system probe failed"
                );
                HealthCheck::unhealthy(self.name(), format!("File system {step} failed"))
                    .with_detail("step", step)
                    .with_detail("error", error)
            }
        };

        check
            .with_detail("directory", self.dir.display().to_string())
            .with_response_time(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::HealthStatus;

    #[tokio::test]
    async fn round_trip_is_healthy_and_cleans_up() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let check = FilesystemProbe::new(dir.path()).check().await;

        assert_eq!(check.status, HealthStatus::Healthy);
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_directory_is_unhealthy() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let check = FilesystemProbe::new(dir.path().join("missing")).check().await;

        assert_eq!(check.status, HealthStatus::Unhealthy);
        let details = check.details.unwrap();
        assert_eq!(details["step"], "write");
        assert!(details.contains_key("error"));
        Ok(())
    }
}
