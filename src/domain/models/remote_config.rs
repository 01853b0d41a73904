//! Remote configuration document.

use serde::{Deserialize, Serialize};

/// Remote key holding the master switch.
pub const KEY_ENABLED: &str = "enabled";
/// Remote key holding the target package identifier.
pub const KEY_PACKAGE_NAME: &str = "package_name";
/// Remote key holding the display name.
pub const KEY_NAME: &str = "name";
/// Remote key holding the artifact download location.
pub const KEY_URL: &str = "url";

/// Desired state published by the remote authority.
///
/// Fetched once per process and never persisted. Every field defaults
/// independently when its read fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub package_id: String,
    pub display_name: String,
    pub download_url: String,
}

impl RemoteConfig {
    pub fn new(
        enabled: bool,
        package_id: impl Into<String>,
        display_name: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            enabled,
            package_id: package_id.into(),
            display_name: display_name.into(),
            download_url: download_url.into(),
        }
    }

    /// Remote keys of the string fields that came back empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (KEY_PACKAGE_NAME, &self.package_id),
            (KEY_NAME, &self.display_name),
            (KEY_URL, &self.download_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(key, _)| key)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
