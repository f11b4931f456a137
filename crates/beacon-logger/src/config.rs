//! File logger configuration.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use beacon_core::{Error, Result};

/// Default directory for log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default size ceiling for a single log file: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of log files kept after rotation.
pub const DEFAULT_MAX_FILES: usize = 10;

/// Where log files live and how many of them are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct LoggerConfig {
    /// Directory that holds the `error-*.log` files
    #[cfg_attr(
        feature = "config",
        arg(long = "log-dir", env = "LOG_DIR", default_value = DEFAULT_LOG_DIR)
    )]
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Size in bytes above which a log file is rotated
    #[cfg_attr(
        feature = "config",
        arg(long = "log-max-file-size", env = "LOG_MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)
    )]
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Number of log files retained; older ones are deleted
    #[cfg_attr(
        feature = "config",
        arg(long = "log-max-files", env = "LOG_MAX_FILES", default_value_t = DEFAULT_MAX_FILES)
    )]
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
        }
    }
}

impl LoggerConfig {
    /// Creates a configuration rooted at `log_dir` with default ceilings.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            ..Self::default()
        }
    }

    /// Set the size ceiling in bytes.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Set the retained-file ceiling.
    #[must_use]
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(Error::configuration("log directory cannot be empty"));
        }

        if self.max_file_size == 0 {
            return Err(Error::configuration("max file size must be greater than 0"));
        }

        if self.max_files == 0 {
            return Err(Error::configuration("max files must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.max_file_size, 10_485_760);
        assert_eq!(config.max_files, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ceilings() {
        assert!(LoggerConfig::default().with_max_files(0).validate().is_err());
        assert!(LoggerConfig::default().with_max_file_size(0).validate().is_err());
        assert!(LoggerConfig::new("").validate().is_err());
    }
}
