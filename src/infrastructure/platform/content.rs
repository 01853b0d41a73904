use async_trait::async_trait;
use reqwest::Url;
use std::path::{Component, Path, PathBuf};

use crate::domain::errors::LaunchError;
use crate::domain::ports::ContentProvider;

/// Content provider exposing one shared directory
///
/// Files under `root` map to `content://<authority>/<relative path>`; every
/// other path is refused.
#[derive(Debug, Clone)]
pub struct SharedDirContentProvider {
    root: PathBuf,
}

impl SharedDirContentProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentProvider for SharedDirContentProvider {
    async fn uri_for_file(&self, authority: &str, path: &Path) -> Result<String, LaunchError> {
        let refuse = |reason: String| LaunchError::Provider {
            path: path.display().to_string(),
            reason,
        };

        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|e| refuse(format!("shared root {}: {e}", self.root.display())))?;
        let file = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| refuse(e.to_string()))?;
        let relative = file
            .strip_prefix(&root)
            .map_err(|_| refuse(format!("outside shared root {}", root.display())))?;

        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if segments.is_empty() {
            return Err(refuse("not a file inside the shared root".to_string()));
        }

        let mut uri = Url::parse(&format!("content://{authority}/"))
            .map_err(|e| refuse(format!("invalid authority {authority}: {e}")))?;
        uri.path_segments_mut()
            .map_err(|()| refuse(format!("invalid authority {authority}")))?
            .clear()
            .extend(&segments);
        Ok(uri.into())
    }
}
