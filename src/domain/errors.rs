//! Domain errors for the install agent.

use std::time::Duration;
use thiserror::Error;

use crate::domain::models::DownloadId;

/// Failure of a single remote configuration read.
///
/// Never surfaced past `ConfigClient`: every variant degrades to the field's
/// safe default.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote store returned HTTP {0}")]
    Status(u16),

    #[error("Timed out reading remote value")]
    Timeout,

    #[error("Failed to decode remote value: {0}")]
    Decode(String),

    #[error("Read cancelled")]
    Cancelled,
}

/// Errors reported by the platform package registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Package registry query failed: {0}")]
    Query(String),

    #[error("No launch entry point for package: {0}")]
    NoLaunchEntry(String),
}

/// Errors from acquiring an artifact.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DownloadError {
    #[error("Failed to submit download: {0}")]
    Submit(String),

    #[error("Download {id} failed: {reason}")]
    Failed { id: DownloadId, reason: String },

    #[error("Download {0} did not complete within {1:?}")]
    TimedOut(DownloadId, Duration),

    #[error("Completion for {received} does not belong to download {expected}")]
    Mismatched {
        expected: DownloadId,
        received: DownloadId,
    },

    #[error("Download {0} was abandoned by the download subsystem")]
    Abandoned(DownloadId),

    #[error("Download cancelled")]
    Cancelled,
}

impl DownloadError {
    /// Returns true if another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Failed { .. } | Self::TimedOut(..) | Self::Abandoned(_)
        )
    }
}

/// Errors from handing an action to the platform.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Failed to start platform action: {0}")]
    Spawn(String),

    #[error("Content provider refused {path}: {reason}")]
    Provider { path: String, reason: String },
}

/// Errors that abort a convergence attempt or the agent itself.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Install state query failed: {0}")]
    InstallQuery(#[source] RegistryError),

    #[error("Artifact acquisition failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Another agent is already running with pid {0}")]
    AlreadyRunning(i32),

    #[error("Lock file error: {0}")]
    Lock(#[from] std::io::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
