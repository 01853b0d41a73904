//! Install dispatch types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mime type of an installable package on the legacy dispatch path.
pub const PACKAGE_ARCHIVE_MIME: &str = "application/vnd.android.package-archive";

/// Lowest platform API level with the scoped file-sharing security model.
pub const SCOPED_MIN_API_LEVEL: u32 = 24;

/// Capability selection as written in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilitySetting {
    #[default]
    Auto,
    Scoped,
    Legacy,
}

/// Install-permission model of the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallCapability {
    /// Files are shared through a permission-scoped content handle.
    Scoped,
    /// Raw file locations are handed to the installer with an explicit mime type.
    Legacy,
}

impl InstallCapability {
    /// Resolve the capability once at startup.
    ///
    /// `Auto` picks `Scoped` unless an API level below
    /// [`SCOPED_MIN_API_LEVEL`] is reported.
    pub fn resolve(setting: CapabilitySetting, api_level: Option<u32>) -> Self {
        match setting {
            CapabilitySetting::Scoped => Self::Scoped,
            CapabilitySetting::Legacy => Self::Legacy,
            CapabilitySetting::Auto => match api_level {
                Some(level) if level < SCOPED_MIN_API_LEVEL => Self::Legacy,
                _ => Self::Scoped,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scoped => "scoped",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for InstallCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data reference carried by a view action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "uri")]
pub enum IntentData {
    /// Permission-scoped content handle.
    Content(String),
    /// Raw `file://` location.
    File(String),
}

impl IntentData {
    pub fn uri(&self) -> &str {
        match self {
            Self::Content(uri) | Self::File(uri) => uri,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentFlags {
    pub grant_read_uri: bool,
    pub new_task: bool,
}

impl IntentFlags {
    /// Flag names in the order they are rendered into launch commands.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.grant_read_uri {
            names.push("grant-read-uri-permission");
        }
        if self.new_task {
            names.push("activity-new-task");
        }
        names
    }
}

/// Generic "view" action handed to the platform installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewIntent {
    pub data: IntentData,
    pub mime_type: Option<String>,
    pub flags: IntentFlags,
    pub not_unknown_source: bool,
}

impl ViewIntent {
    /// View action for a content handle on the scoped path.
    pub fn scoped(content_uri: impl Into<String>) -> Self {
        Self {
            data: IntentData::Content(content_uri.into()),
            mime_type: None,
            flags: IntentFlags {
                grant_read_uri: true,
                new_task: true,
            },
            not_unknown_source: true,
        }
    }

    /// View action for a raw file location on the legacy path.
    pub fn legacy(file_uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: IntentData::File(file_uri.into()),
            mime_type: Some(mime_type.into()),
            flags: IntentFlags {
                grant_read_uri: false,
                new_task: true,
            },
            not_unknown_source: false,
        }
    }
}

/// Request to bring an installed package to the foreground.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchIntent {
    pub package_id: String,
    pub entry_point: String,
}
