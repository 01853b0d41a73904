use async_trait::async_trait;
use std::path::Path;

use crate::domain::ports::ArtifactStore;

/// Artifact store backed by the local filesystem
///
/// In-flight transfers are written to a `.part` sibling and renamed when
/// complete, so a regular file at the destination is always whole.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsArtifactStore;

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .is_ok_and(|metadata| metadata.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_exists_only_for_regular_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("App.apk");
        tokio::fs::write(&file, b"pkg").await.unwrap();

        let store = FsArtifactStore;
        assert!(store.exists(&file).await);
        assert!(!store.exists(dir.path()).await);
        assert!(!store.exists(&dir.path().join("Other.apk")).await);
    }
}
