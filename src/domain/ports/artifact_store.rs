//! Artifact store port - local artifact existence checks.

use async_trait::async_trait;
use std::path::Path;

/// Local persistent storage holding downloaded artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Whether a complete artifact exists at `path`. I/O failures count as absent.
    async fn exists(&self, path: &Path) -> bool;
}
