//! Remote configuration client.
//!
//! Reads the four fields of the remote document independently. Every read is
//! a bounded request/response call returning `Result`; the safe-default policy
//! is applied in [`ConfigClient::fetch`], so a failed read never reaches the
//! convergence loop as an error.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::domain::errors::FetchError;
use crate::domain::models::remote_config::{KEY_ENABLED, KEY_NAME, KEY_PACKAGE_NAME, KEY_URL};
use crate::domain::models::RemoteConfig;
use crate::domain::ports::RemoteStore;

pub struct ConfigClient {
    store: Arc<dyn RemoteStore>,
    read_timeout: Duration,
    cancel: CancellationToken,
}

impl ConfigClient {
    pub fn new(store: Arc<dyn RemoteStore>, read_timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            store,
            read_timeout,
            cancel,
        }
    }

    /// Fetch the remote document, substituting defaults for failed reads.
    ///
    /// The four reads run concurrently and all of them finish (or default)
    /// before this returns.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> RemoteConfig {
        let (enabled, package_id, display_name, download_url) = tokio::join!(
            self.read_bool(KEY_ENABLED),
            self.read_string(KEY_PACKAGE_NAME),
            self.read_string(KEY_NAME),
            self.read_string(KEY_URL),
        );

        let config = RemoteConfig {
            enabled: enabled
                .inspect_err(|err| log_degraded(KEY_ENABLED, err))
                .unwrap_or_default(),
            package_id: package_id
                .inspect_err(|err| log_degraded(KEY_PACKAGE_NAME, err))
                .unwrap_or_default(),
            display_name: display_name
                .inspect_err(|err| log_degraded(KEY_NAME, err))
                .unwrap_or_default(),
            download_url: download_url
                .inspect_err(|err| log_degraded(KEY_URL, err))
                .unwrap_or_default(),
        };

        debug!(
            enabled = config.enabled,
            package_id = %config.package_id,
            display_name = %config.display_name,
            "remote config fetched"
        );
        config
    }

    /// Read a boolean field; an absent value decodes to `false`.
    pub async fn read_bool(&self, key: &str) -> Result<bool, FetchError> {
        match self.read_value(key).await? {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(value)) => Ok(value),
            Some(other) => Err(FetchError::Decode(format!(
                "expected boolean for '{key}', got {other}"
            ))),
        }
    }

    /// Read a string field; an absent value decodes to `""`.
    pub async fn read_string(&self, key: &str) -> Result<String, FetchError> {
        match self.read_value(key).await? {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(value)) => Ok(value),
            Some(other) => Err(FetchError::Decode(format!(
                "expected string for '{key}', got {other}"
            ))),
        }
    }

    async fn read_value(&self, key: &str) -> Result<Option<Value>, FetchError> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(FetchError::Cancelled),
            result = timeout(self.read_timeout, self.store.read(key)) => {
                result.unwrap_or(Err(FetchError::Timeout))
            }
        }
    }
}

fn log_degraded(key: &str, err: &FetchError) {
    match err {
        FetchError::Transport(_) | FetchError::Status(_) => {
            warn!(key, error = %err, "remote read failed, using default");
        }
        _ => debug!(key, error = %err, "remote read degraded, using default"),
    }
}
