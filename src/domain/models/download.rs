//! Download task and completion types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::remote_config::RemoteConfig;

/// Identifier assigned to a download when it is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadId(Uuid);

impl DownloadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DownloadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One artifact acquisition request.
///
/// Re-derived from the remote configuration on every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    pub url: String,
    pub destination: PathBuf,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
        }
    }

    /// Build the task for `config`, naming the artifact
    /// `<display_name>.<extension>` inside `downloads_dir`.
    pub fn for_config(config: &RemoteConfig, downloads_dir: &Path, extension: &str) -> Self {
        Self::new(
            config.download_url.clone(),
            artifact_path(downloads_dir, &config.display_name, extension),
        )
    }
}

/// Deterministic local path of the artifact for a display name.
///
/// The file name is always a single segment directly inside `downloads_dir`:
/// path separators are replaced and an all-dot name cannot name a directory.
pub fn artifact_path(downloads_dir: &Path, display_name: &str, extension: &str) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    let mut file_name = format!("{display_name}.{extension}").replace(['/', '\\'], "_");
    if file_name.chars().all(|c| c == '.') {
        file_name = file_name.replace('.', "_");
    }
    downloads_dir.join(file_name)
}

/// Terminal status of a submitted download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum DownloadStatus {
    Successful,
    Failed(String),
}

/// Completion event for exactly one submitted download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadCompletion {
    pub id: DownloadId,
    pub status: DownloadStatus,
}

impl DownloadCompletion {
    pub fn successful(id: DownloadId) -> Self {
        Self {
            id,
            status: DownloadStatus::Successful,
        }
    }

    pub fn failed(id: DownloadId, reason: impl Into<String>) -> Self {
        Self {
            id,
            status: DownloadStatus::Failed(reason.into()),
        }
    }
}
