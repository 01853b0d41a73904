//! Download subsystem port - out-of-band artifact downloads.

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::DownloadError;
use crate::domain::models::{DownloadCompletion, DownloadId, DownloadTask};

/// Handle to one submitted download.
///
/// The completion channel belongs to this submission alone, so a completion
/// for any other request can never reach the caller. Dropping the handle
/// cancels the transfer behind it.
#[derive(Debug)]
pub struct DownloadHandle {
    pub id: DownloadId,
    pub completion: oneshot::Receiver<DownloadCompletion>,
    transfer: Option<CancellationToken>,
}

impl DownloadHandle {
    pub fn new(id: DownloadId, completion: oneshot::Receiver<DownloadCompletion>) -> Self {
        Self {
            id,
            completion,
            transfer: None,
        }
    }

    /// Tie a background transfer to this handle; it is cancelled on drop.
    #[must_use]
    pub fn with_transfer(mut self, transfer: CancellationToken) -> Self {
        self.transfer = Some(transfer);
        self
    }
}

impl Drop for DownloadHandle {
    fn drop(&mut self) {
        if let Some(transfer) = self.transfer.take() {
            transfer.cancel();
        }
    }
}

/// Asynchronous download service performing transfers in the background.
#[async_trait]
pub trait DownloadSubsystem: Send + Sync {
    /// Queue `task` and return immediately with its completion handle.
    async fn submit(&self, task: &DownloadTask) -> Result<DownloadHandle, DownloadError>;
}
