//! Package registry port - installed package queries.

use async_trait::async_trait;

use crate::domain::errors::RegistryError;

/// Installed package metadata returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub package_id: String,
    /// Raw registry answer, e.g. the installed path.
    pub detail: Option<String>,
}

/// The platform's registry of installed packages.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Look up an installed package. Absent packages yield
    /// [`RegistryError::NotFound`].
    async fn package_info(&self, package_id: &str) -> Result<PackageInfo, RegistryError>;

    /// Resolve the entry point that starts `package_id` in the foreground.
    async fn launch_entry(&self, package_id: &str) -> Result<String, RegistryError>;
}
