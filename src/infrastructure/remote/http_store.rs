//! REST adapter for the remote key-value store.
//!
//! Values live at `{base_url}/{root}/{key}.json`; the store answers with the
//! raw JSON value, or `null` when the key holds nothing.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::errors::FetchError;
use crate::domain::models::RemoteConfigSource;
use crate::domain::ports::RemoteStore;
use crate::infrastructure::logging::SecretScrubber;

/// HTTP client for the remote configuration store
pub struct HttpRemoteStore {
    http_client: ReqwestClient,
    base_url: String,
    root: String,
    auth_token: Option<String>,
}

impl HttpRemoteStore {
    /// Create a store client from configuration
    ///
    /// # Returns
    /// * `Err(FetchError::Transport)` - The HTTP client could not be built
    pub fn new(source: &RemoteConfigSource) -> Result<Self, FetchError> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(source.timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: source.base_url.trim_end_matches('/').to_string(),
            root: source.root.trim_matches('/').to_string(),
            auth_token: source.auth_token.clone().filter(|token| !token.is_empty()),
        })
    }

    fn value_url(&self, key: &str) -> String {
        let url = format!("{}/{}/{}.json", self.base_url, self.root, key);
        match self.auth_token {
            Some(ref token) => format!("{url}?auth={token}"),
            None => url,
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    #[instrument(skip(self), fields(root = %self.root))]
    async fn read(&self, key: &str) -> Result<Option<Value>, FetchError> {
        let url = self.value_url(key);
        debug!(url = %SecretScrubber::scrub(&url), "reading remote value");

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify_transport_error)?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(match value {
            Value::Null => None,
            value => Some(value),
        })
    }
}

fn classify_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        // reqwest includes the request URL in its message
        FetchError::Transport(SecretScrubber::scrub(&err.to_string()).into_owned())
    }
}
