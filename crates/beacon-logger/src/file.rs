//! Rotating JSON-lines error logger.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use jiff::Timestamp;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::{LogRecord, LoggerConfig, TRACING_TARGET_FALLBACK, TRACING_TARGET_FILE};

const FILE_PREFIX: &str = "error-";
const FILE_SUFFIX: &str = ".log";
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

struct ErrorLoggerInner {
    config: LoggerConfig,
    // Serializes append + rotation within this process.
    write_lock: Mutex<()>,
}

/// Appends [`LogRecord`]s to dated files and keeps the directory bounded.
///
/// Records for the current UTC day go to `error-YYYY-MM-DD.log`. After every
/// append the directory is rotated: files beyond [`LoggerConfig::max_files`]
/// (oldest by filename) are deleted and a canonical file larger than
/// [`LoggerConfig::max_file_size`] is renamed to
/// `error-YYYY-MM-DD-<millis>.log`.
///
/// No method returns an error. Failures are reported on the fallback tracing
/// target so that a broken disk cannot turn logging into a new failure.
#[derive(Clone)]
pub struct ErrorLogger {
    inner: Arc<ErrorLoggerInner>,
}

impl std::fmt::Debug for ErrorLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLogger")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ErrorLogger {
    /// Creates a logger. The directory is created lazily on first write.
    pub fn new(config: LoggerConfig) -> Self {
        let inner = ErrorLoggerInner {
            config,
            write_lock: Mutex::new(()),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the logger configuration.
    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    /// Returns the log directory.
    pub fn log_dir(&self) -> &Path {
        &self.inner.config.log_dir
    }

    /// Path of the file that receives records written now.
    pub fn current_file(&self) -> PathBuf {
        let date = Timestamp::now().strftime("%Y-%m-%d");
        self.log_dir()
            .join(format!("{FILE_PREFIX}{date}{FILE_SUFFIX}"))
    }

    /// Appends one record to today's file, then rotates.
    pub async fn log_to_file(&self, record: &LogRecord) {
        let _guard = self.inner.write_lock.lock().await;

        if let Err(error) = self.append(record).await {
            tracing::error!(
                target: TRACING_TARGET_FALLBACK,
                record_id = %record.id,
                message = %record.message,
                error = %error,
                "Failed to write log record"
            );
            return;
        }

        self.rotate_locked().await;
    }

    async fn append(&self, record: &LogRecord) -> io::Result<()> {
        fs::create_dir_all(self.log_dir()).await?;

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let path = self.current_file();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        tracing::trace!(
            target: TRACING_TARGET_FILE,
            record_id = %record.id,
            path = %path.display(),
            "Log record appended"
        );

        Ok(())
    }

    /// Applies the retention and size ceilings to the log directory.
    pub async fn rotate(&self) {
        let _guard = self.inner.write_lock.lock().await;
        self.rotate_locked().await;
    }

    async fn rotate_locked(&self) {
        if let Err(error) = self.try_rotate().await {
            tracing::error!(
                target: TRACING_TARGET_FALLBACK,
                error = %error,
                "Failed to rotate log files"
            );
        }
    }

    async fn try_rotate(&self) -> io::Result<()> {
        let files = self.list_files().await?;
        let config = &self.inner.config;

        for (name, path) in files.iter().skip(config.max_files) {
            match fs::remove_file(path).await {
                Ok(()) => tracing::debug!(
                    target: TRACING_TARGET_FILE,
                    file = %name,
                    "Evicted log file beyond retention"
                ),
                Err(error) => tracing::warn!(
                    target: TRACING_TARGET_FALLBACK,
                    file = %name,
                    error = %error,
                    "Failed to evict log file"
                ),
            }
        }

        for (name, path) in files.iter().take(config.max_files) {
            let Some(date) = canonical_date(name) else {
                continue;
            };

            let size = match fs::metadata(path).await {
                Ok(metadata) => metadata.len(),
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_FALLBACK,
                        file = %name,
                        error = %error,
                        "Failed to stat log file"
                    );
                    continue;
                }
            };

            if size <= config.max_file_size {
                continue;
            }

            let millis = Timestamp::now().as_millisecond();
            let archived = self
                .log_dir()
                .join(format!("{FILE_PREFIX}{date}-{millis}{FILE_SUFFIX}"));
            fs::rename(path, &archived).await?;

            tracing::info!(
                target: TRACING_TARGET_FILE,
                file = %name,
                archived = %archived.display(),
                size,
                "Rotated log file"
            );
        }

        Ok(())
    }

    /// Reads up to `limit` records, newest first.
    ///
    /// Files are visited newest first and lines within a file in reverse.
    /// Unparseable lines (including invalid UTF-8) and unreadable files are
    /// skipped.
    pub async fn recent_logs(&self, limit: usize) -> Vec<LogRecord> {
        let mut records = Vec::with_capacity(limit.min(1024));
        if limit == 0 {
            return records;
        }

        let files = match self.list_files().await {
            Ok(files) => files,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_FALLBACK,
                    error = %error,
                    "Failed to list log files"
                );
                return records;
            }
        };

        for (name, path) in files {
            let contents = match fs::read(&path).await {
                Ok(contents) => contents,
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_FALLBACK,
                        file = %name,
                        error = %error,
                        "Skipping unreadable log file"
                    );
                    continue;
                }
            };

            let lines = contents
                .split(|byte| *byte == b'\n')
                .rev()
                .filter(|line| !line.trim_ascii().is_empty());
            for line in lines {
                match serde_json::from_slice::<LogRecord>(line) {
                    Ok(record) => records.push(record),
                    Err(error) => {
                        tracing::debug!(
                            target: TRACING_TARGET_FILE,
                            file = %name,
                            error = %error,
                            "Skipping malformed log line"
                        );
                        continue;
                    }
                }

                if records.len() >= limit {
                    return records;
                }
            }
        }

        records
    }

    /// Deletes log files last modified more than `older_than_days` days ago.
    ///
    /// Returns the number of files removed.
    pub async fn clear_logs(&self, older_than_days: u32) -> usize {
        let _guard = self.inner.write_lock.lock().await;

        let age = Duration::from_secs(u64::from(older_than_days) * SECONDS_PER_DAY);
        let Some(cutoff) = SystemTime::now().checked_sub(age) else {
            return 0;
        };

        let files = match self.list_files().await {
            Ok(files) => files,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_FALLBACK,
                    error = %error,
                    "Failed to list log files"
                );
                return 0;
            }
        };

        let mut removed = 0;
        for (name, path) in files {
            let modified = match fs::metadata(&path).await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_FALLBACK,
                        file = %name,
                        error = %error,
                        "Failed to read log file modification time"
                    );
                    continue;
                }
            };

            if modified >= cutoff {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(error) => tracing::warn!(
                    target: TRACING_TARGET_FALLBACK,
                    file = %name,
                    error = %error,
                    "Failed to delete old log file"
                ),
            }
        }

        if removed > 0 {
            tracing::info!(
                target: TRACING_TARGET_FILE,
                removed,
                older_than_days,
                "Cleared old log files"
            );
        }

        removed
    }

    /// Lists `error-*.log` files sorted by filename, newest first.
    async fn list_files(&self) -> io::Result<Vec<(String, PathBuf)>> {
        let mut entries = match fs::read_dir(self.log_dir()).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };

            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
                files.push((name, entry.path()));
            }
        }

        files.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(files)
    }
}

/// Returns the date part of a canonical `error-YYYY-MM-DD.log` name.
///
/// Archived names carry an extra suffix and return `None`.
fn canonical_date(name: &str) -> Option<&str> {
    let date = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    let is_date = date.len() == 10
        && date.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });

    is_date.then_some(date)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::TempDir;

    use super::*;
    use crate::LogLevel;

    fn logger(dir: &TempDir) -> ErrorLogger {
        ErrorLogger::new(LoggerConfig::new(dir.path()))
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn canonical_date_rejects_archived_names() {
        assert_eq!(canonical_date("error-2024-05-01.log"), Some("2024-05-01"));
        assert_eq!(canonical_date("error-2024-05-01-1714521600000.log"), None);
        assert_eq!(canonical_date("access-2024-05-01.log"), None);
    }

    #[tokio::test]
    async fn appends_one_json_line_per_record() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let logger = logger(&dir);

        logger.log_to_file(&LogRecord::error("first")).await;
        logger.log_to_file(&LogRecord::new(LogLevel::Info, "second")).await;

        let contents = std::fs::read_to_string(logger.current_file())?;
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: LogRecord = serde_json::from_str(lines[0])?;
        assert_eq!(first.message, "first");
        Ok(())
    }

    #[tokio::test]
    async fn creates_missing_directory() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let nested = dir.path().join("nested").join("logs");
        let logger = ErrorLogger::new(LoggerConfig::new(&nested));

        logger.log_to_file(&LogRecord::error("boom")).await;

        assert!(logger.current_file().exists());
        Ok(())
    }

    #[tokio::test]
    async fn oversized_file_is_archived() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let logger = ErrorLogger::new(LoggerConfig::new(dir.path()).with_max_file_size(256));

        for i in 0..4 {
            logger.log_to_file(&LogRecord::error(format!("record {i}"))).await;
            if !logger.current_file().exists() {
                break;
            }
        }

        assert!(!logger.current_file().exists(), "canonical file should be vacated");
        let archived: Vec<String> = file_names(dir.path())
            .into_iter()
            .filter(|name| canonical_date(name).is_none())
            .collect();
        assert_eq!(archived.len(), 1);

        logger.log_to_file(&LogRecord::error("after rotation")).await;
        let contents = std::fs::read_to_string(logger.current_file())?;
        assert_eq!(contents.lines().count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn retention_keeps_newest_files() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        for day in 1..=12 {
            std::fs::write(dir.path().join(format!("error-2024-01-{day:02}.log")), "{}\n")?;
        }
        std::fs::write(dir.path().join("unrelated.txt"), "keep")?;

        logger(&dir).rotate().await;

        let names = file_names(dir.path());
        assert_eq!(names.len(), 11);
        assert!(!names.contains(&"error-2024-01-01.log".to_owned()));
        assert!(!names.contains(&"error-2024-01-02.log".to_owned()));
        assert!(names.contains(&"error-2024-01-12.log".to_owned()));
        assert!(names.contains(&"unrelated.txt".to_owned()));
        Ok(())
    }

    #[tokio::test]
    async fn recent_logs_newest_first_and_skips_malformed() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let older = LogRecord::error("older");
        let newer = LogRecord::error("newer");
        let newest = LogRecord::error("newest");

        let old_file = format!(
            "{}\n{}\n",
            serde_json::to_string(&older)?,
            serde_json::to_string(&newer)?
        );
        std::fs::write(dir.path().join("error-2024-01-01.log"), old_file)?;
        let new_file = format!("{}\nnot json at all\n", serde_json::to_string(&newest)?);
        std::fs::write(dir.path().join("error-2024-01-02.log"), new_file)?;

        let logger = logger(&dir);

        let all = logger.recent_logs(10).await;
        let messages: Vec<&str> = all.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["newest", "newer", "older"]);

        let limited = logger.recent_logs(2).await;
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].message, "newer");

        assert!(logger.recent_logs(0).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn recent_logs_skips_invalid_utf8_lines() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let mut contents = serde_json::to_vec(&LogRecord::error("intact"))?;
        contents.push(b'\n');
        contents.extend_from_slice(b"\xff\xfe torn line\n");
        std::fs::write(dir.path().join("error-2024-01-02.log"), contents)?;

        let records = logger(&dir).recent_logs(10).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "intact");
        Ok(())
    }

    #[tokio::test]
    async fn recent_logs_on_missing_directory_is_empty()-> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let logger = ErrorLogger::new(LoggerConfig::new(dir.path().join("absent")));
        assert!(logger.recent_logs(5).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn clear_logs_is_idempotent() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let stale = SystemTime::now() - Duration::from_secs(40 * SECONDS_PER_DAY);

        for (name, old) in [
            ("error-2024-01-01.log", true),
            ("error-2024-01-02.log", true),
            ("error-2024-03-01.log", false),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, "{}\n")?;
            if old {
                File::options().write(true).open(&path)?.set_modified(stale)?;
            }
        }

        let logger = logger(&dir);
        assert_eq!(logger.clear_logs(30).await, 2);
        let after_first = file_names(dir.path());

        assert_eq!(logger.clear_logs(30).await, 0);
        assert_eq!(file_names(dir.path()), after_first);
        assert_eq!(after_first, vec!["error-2024-03-01.log".to_owned()]);
        Ok(())
    }
}
