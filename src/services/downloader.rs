//! Artifact downloader.
//!
//! Makes sure the artifact for a [`DownloadTask`] exists locally, submitting
//! it to the download subsystem only when the artifact store does not already
//! hold it. Every submission is awaited through its own completion channel
//! with a timeout; transient failures are retried with exponential backoff.

use backoff::ExponentialBackoffBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::DownloadError;
use crate::domain::models::{DownloadConfig, DownloadStatus, DownloadTask};
use crate::domain::ports::{ArtifactStore, DownloadSubsystem};

/// Timeout and retry policy for one `ensure_local` call.
#[derive(Debug, Clone)]
pub struct DownloadPolicy {
    /// Maximum wait for the completion of a single submission
    pub completion_timeout: Duration,
    /// Retries after the first failed submission
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self::from(&DownloadConfig::default())
    }
}

impl From<&DownloadConfig> for DownloadPolicy {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            completion_timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

pub struct Downloader {
    store: Arc<dyn ArtifactStore>,
    subsystem: Arc<dyn DownloadSubsystem>,
    policy: DownloadPolicy,
    cancel: CancellationToken,
}

impl Downloader {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        subsystem: Arc<dyn DownloadSubsystem>,
        policy: DownloadPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            subsystem,
            policy,
            cancel,
        }
    }

    /// Ensure the artifact is present at `task.destination` and return its path.
    ///
    /// Returns without touching the network when the artifact already exists.
    #[instrument(skip(self), fields(destination = %task.destination.display()))]
    pub async fn ensure_local(&self, task: &DownloadTask) -> Result<PathBuf, DownloadError> {
        if self.store.exists(&task.destination).await {
            debug!("artifact already present, skipping download");
            return Ok(task.destination.clone());
        }

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.policy.initial_backoff)
            .with_max_interval(self.policy.max_backoff)
            .with_max_elapsed_time(None)
            .build();

        let max_attempts = self.policy.max_retries.saturating_add(1);
        let mut attempt = 0u32;
        let operation = || {
            attempt += 1;
            let current = attempt;
            async move {
                self.attempt(task).await.map_err(|err| {
                    if err.is_transient() && current < max_attempts {
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        };

        let retried = backoff::future::retry_notify(backoff, operation, |err, wait: Duration| {
            warn!(error = %err, retry_in_ms = wait.as_millis(), "download attempt failed, retrying");
        });

        let path = tokio::select! {
            () = self.cancel.cancelled() => Err(DownloadError::Cancelled),
            result = retried => result,
        }?;

        info!(path = %path.display(), "artifact downloaded");
        Ok(path)
    }

    /// Submit once and wait for this submission's own completion.
    ///
    /// The handle lives until this returns, so a timed out, cancelled or
    /// rejected submission stops its transfer before any retry starts.
    async fn attempt(&self, task: &DownloadTask) -> Result<PathBuf, DownloadError> {
        let mut handle = self.subsystem.submit(task).await?;
        let id = handle.id;
        debug!(download_id = %id, url = %task.url, "download submitted");

        let completion = tokio::select! {
            () = self.cancel.cancelled() => return Err(DownloadError::Cancelled),
            result = timeout(self.policy.completion_timeout, &mut handle.completion) => match result {
                Err(_) => return Err(DownloadError::TimedOut(id, self.policy.completion_timeout)),
                Ok(Err(_)) => return Err(DownloadError::Abandoned(id)),
                Ok(Ok(completion)) => completion,
            },
        };

        if completion.id != id {
            return Err(DownloadError::Mismatched {
                expected: id,
                received: completion.id,
            });
        }

        match completion.status {
            DownloadStatus::Failed(reason) => Err(DownloadError::Failed { id, reason }),
            DownloadStatus::Successful if !self.store.exists(&task.destination).await => {
                Err(DownloadError::Failed {
                    id,
                    reason: "artifact missing after completion".to_string(),
                })
            }
            DownloadStatus::Successful => Ok(task.destination.clone()),
        }
    }
}
