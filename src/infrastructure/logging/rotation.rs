//! Log retention
//!
//! The rolling appender creates one file per period
//! (`install-agent.log.<date>`); files older than the retention window are
//! deleted at startup.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::{debug, info, warn};

use super::logger::LOG_FILE_PREFIX;

/// Deletes rotated log files past the retention window
#[derive(Debug, Clone)]
pub struct LogRetention {
    retention_days: u32,
}

impl LogRetention {
    pub fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }

    /// Delete log files in `log_dir` last modified before the retention window
    ///
    /// # Returns
    /// Number of files deleted
    pub async fn cleanup_old_logs(&self, log_dir: impl AsRef<Path>) -> Result<usize> {
        let log_dir = log_dir.as_ref();

        if !log_dir.exists() {
            debug!(path = %log_dir.display(), "log directory does not exist yet");
            return Ok(0);
        }

        let cutoff = Utc::now() - Duration::days(i64::from(self.retention_days));
        let mut deleted_count = 0;

        let mut entries = tokio::fs::read_dir(log_dir)
            .await
            .context("failed to read log directory")?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .context("failed to read directory entry")?
        {
            let path = entry.path();
            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
            if !is_log {
                continue;
            }

            let modified: DateTime<Utc> = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified.into(),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "cannot read log file age");
                    continue;
                }
            };

            if modified < cutoff {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {
                        debug!(path = %path.display(), "deleted expired log file");
                        deleted_count += 1;
                    }
                    Err(err) => warn!(path = %path.display(), error = %err, "failed to delete log file"),
                }
            }
        }

        if deleted_count > 0 {
            info!(deleted = deleted_count, retention_days = self.retention_days, "cleaned up old logs");
        }
        Ok(deleted_count)
    }
}
