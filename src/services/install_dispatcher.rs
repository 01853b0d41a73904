//! Install dispatch.
//!
//! Hands a local artifact to the platform installer. The dispatch path is
//! chosen by the [`InstallCapability`] resolved at startup; the call never
//! reports whether the user accepted the install.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::application::AgentContext;
use crate::domain::errors::LaunchError;
use crate::domain::models::{InstallCapability, ViewIntent};
use crate::domain::ports::{ActionLauncher, ContentProvider};

pub struct InstallDispatcher {
    capability: InstallCapability,
    authority: String,
    package_mime: String,
    provider: Arc<dyn ContentProvider>,
    launcher: Arc<dyn ActionLauncher>,
}

impl InstallDispatcher {
    pub fn new(
        ctx: &AgentContext,
        package_mime: impl Into<String>,
        provider: Arc<dyn ContentProvider>,
        launcher: Arc<dyn ActionLauncher>,
    ) -> Self {
        Self {
            capability: ctx.capability(),
            authority: ctx.provider_authority(),
            package_mime: package_mime.into(),
            provider,
            launcher,
        }
    }

    pub fn capability(&self) -> InstallCapability {
        self.capability
    }

    /// Start the platform install flow for `path`. Fire-and-forget.
    #[instrument(skip(self), fields(capability = %self.capability))]
    pub async fn install(&self, path: &Path) {
        match self.dispatch(path).await {
            Ok(()) => info!(path = %path.display(), "install flow started"),
            Err(err) => warn!(path = %path.display(), error = %err, "install dispatch failed"),
        }
    }

    async fn dispatch(&self, path: &Path) -> Result<(), LaunchError> {
        let intent = match self.capability {
            InstallCapability::Scoped => {
                let content_uri = self.provider.uri_for_file(&self.authority, path).await?;
                ViewIntent::scoped(content_uri)
            }
            InstallCapability::Legacy => {
                ViewIntent::legacy(file_uri(path), self.package_mime.as_str())
            }
        };
        self.launcher.view(&intent).await
    }
}

/// `file://` location of a local path, made absolute against the working directory.
pub fn file_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}
