//! Platform action ports - content sharing and external action launching.

use async_trait::async_trait;
use std::path::Path;

use crate::domain::errors::LaunchError;
use crate::domain::models::{LaunchIntent, ViewIntent};

/// File-sharing provider issuing permission-scoped content handles.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Content URI for `path` under `authority`.
    async fn uri_for_file(&self, authority: &str, path: &Path) -> Result<String, LaunchError>;
}

/// Generic "launch external action" primitive.
///
/// Both calls return once the platform has accepted the action; they never
/// wait for the user-facing flow that follows.
#[async_trait]
pub trait ActionLauncher: Send + Sync {
    async fn view(&self, intent: &ViewIntent) -> Result<(), LaunchError>;

    async fn launch(&self, intent: &LaunchIntent) -> Result<(), LaunchError>;
}
