//! Remote store port - single-value reads from the remote key-value store.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::FetchError;

/// Read access to the remote configuration store.
///
/// Each call is one request/response exchange bounded by the adapter's
/// timeout. `Ok(None)` means the key holds no value.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the value stored under `key` in the configured root collection.
    async fn read(&self, key: &str) -> Result<Option<Value>, FetchError>;
}
