//! Background HTTP download manager.
//!
//! Each submission spawns its own transfer task and owns a oneshot channel
//! that receives exactly one [`DownloadCompletion`] for that submission.
//! Transfers write to a partial file private to their download id and stop,
//! discarding it, once their handle is dropped.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client as ReqwestClient, Url};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::DownloadError;
use crate::domain::models::{DownloadCompletion, DownloadId, DownloadTask};
use crate::domain::ports::{DownloadHandle, DownloadSubsystem};
use crate::infrastructure::logging::SecretScrubber;

/// Suffix of files still being written
const PARTIAL_SUFFIX: &str = "part";

pub struct HttpDownloadManager {
    http_client: ReqwestClient,
}

impl HttpDownloadManager {
    pub fn new() -> Result<Self, DownloadError> {
        let http_client = ReqwestClient::builder()
            .build()
            .map_err(|e| DownloadError::Submit(e.to_string()))?;
        Ok(Self { http_client })
    }

    pub fn with_client(http_client: ReqwestClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl DownloadSubsystem for HttpDownloadManager {
    async fn submit(&self, task: &DownloadTask) -> Result<DownloadHandle, DownloadError> {
        let id = DownloadId::new();
        let (tx, rx) = oneshot::channel();

        // An unusable URL is reported through the completion like any other
        // failed transfer, so the downloader retries it on its next attempt
        let url = Url::parse(&task.url);
        let client = self.http_client.clone();
        let destination = task.destination.clone();
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        tokio::spawn(async move {
            let completion = match url {
                Ok(url) => match transfer(&client, url, &destination, id, &stop).await {
                    Ok(bytes) => {
                        info!(download_id = %id, bytes, path = %destination.display(), "download complete");
                        DownloadCompletion::successful(id)
                    }
                    Err(reason) if stop.is_cancelled() => {
                        debug!(download_id = %id, "download stopped by its caller");
                        DownloadCompletion::failed(id, reason)
                    }
                    Err(reason) => {
                        warn!(download_id = %id, reason = %reason, "download failed");
                        DownloadCompletion::failed(id, reason)
                    }
                },
                Err(err) => DownloadCompletion::failed(id, format!("invalid download url: {err}")),
            };
            // The receiver is gone when the caller timed out or was cancelled
            let _ = tx.send(completion);
        });

        Ok(DownloadHandle::new(id, rx).with_transfer(cancel))
    }
}

/// Stream `url` into `destination`, returning the number of bytes written.
///
/// Nothing reaches `destination` when `stop` fires before the stream ends.
#[instrument(skip(client, url, stop), fields(url = %SecretScrubber::scrub(url.as_str())))]
async fn transfer(
    client: &ReqwestClient,
    url: Url,
    destination: &Path,
    id: DownloadId,
    stop: &CancellationToken,
) -> Result<u64, String> {
    let partial = partial_path(destination, id);
    let result = tokio::select! {
        () = stop.cancelled() => Err("transfer cancelled".to_string()),
        result = stream_to(client, url, &partial) => result,
    };

    match result {
        Ok(bytes) => match tokio::fs::rename(&partial, destination).await {
            Ok(()) => Ok(bytes),
            Err(err) => {
                remove_partial(&partial).await;
                Err(format!("failed to move artifact into place: {err}"))
            }
        },
        Err(reason) => {
            remove_partial(&partial).await;
            Err(reason)
        }
    }
}

async fn stream_to(client: &ReqwestClient, url: Url, partial: &Path) -> Result<u64, String> {
    if let Some(parent) = partial.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("failed to create download directory: {e}"))?;
    }

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SecretScrubber::scrub(&e.to_string()).into_owned())?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("server returned HTTP {}", status.as_u16()));
    }

    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| format!("failed to create {}: {e}", partial.display()))?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| SecretScrubber::scrub(&e.to_string()).into_owned())?;
        file.write_all(&chunk)
            .await
            .map_err(|e| format!("failed to write artifact: {e}"))?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| format!("failed to flush artifact: {e}"))?;

    debug!(bytes = written, "transfer finished");
    Ok(written)
}

async fn remove_partial(partial: &Path) {
    if let Err(err) = tokio::fs::remove_file(partial).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %partial.display(), error = %err, "failed to remove partial download");
        }
    }
}

/// `<destination>.<id>.part`, so concurrent transfers never share a file.
fn partial_path(destination: &Path, id: DownloadId) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(format!(".{id}.{PARTIAL_SUFFIX}"));
    PathBuf::from(name)
}
