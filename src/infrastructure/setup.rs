//! Host wiring
//!
//! Builds the host adapters for a resolved [`Config`] and prepares the
//! directories they work in.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

use crate::application::Collaborators;
use crate::domain::models::Config;
use crate::infrastructure::download::{FsArtifactStore, HttpDownloadManager};
use crate::infrastructure::platform::{
    CommandActionLauncher, CommandPackageRegistry, SharedDirContentProvider,
};
use crate::infrastructure::remote::HttpRemoteStore;

/// Create the downloads directory and the shared root
pub fn prepare_directories(config: &Config) -> Result<()> {
    for dir in [&config.agent.downloads_dir, &config.platform.shared_root] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    if !config.agent.downloads_dir.starts_with(&config.platform.shared_root) {
        debug!(
            downloads_dir = %config.agent.downloads_dir.display(),
            shared_root = %config.platform.shared_root.display(),
            "downloads directory is outside the shared root; scoped installs will be refused"
        );
    }
    Ok(())
}

/// Build the host adapters described by `config`
pub fn build_collaborators(config: &Config) -> Result<Collaborators> {
    let remote_store =
        HttpRemoteStore::new(&config.remote).context("failed to build remote store client")?;
    let downloads = HttpDownloadManager::new().context("failed to build download client")?;

    Ok(Collaborators {
        remote_store: Arc::new(remote_store),
        artifact_store: Arc::new(FsArtifactStore),
        downloads: Arc::new(downloads),
        registry: Arc::new(CommandPackageRegistry::new(&config.platform)),
        content_provider: Arc::new(SharedDirContentProvider::new(
            config.platform.shared_root.clone(),
        )),
        launcher: Arc::new(CommandActionLauncher::new(&config.platform)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_directories_creates_both() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.platform.shared_root = dir.path().join("shared");
        config.agent.downloads_dir = dir.path().join("shared/downloads");

        prepare_directories(&config).unwrap();
        assert!(config.agent.downloads_dir.is_dir());
        assert!(config.platform.shared_root.is_dir());
    }

    #[test]
    fn test_build_collaborators_from_defaults() {
        assert!(build_collaborators(&Config::default()).is_ok());
    }
}
