//! Installed-state queries.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::errors::{AgentError, AgentResult, RegistryError};
use crate::domain::ports::PackageRegistry;

pub struct InstallChecker {
    registry: Arc<dyn PackageRegistry>,
}

impl InstallChecker {
    pub fn new(registry: Arc<dyn PackageRegistry>) -> Self {
        Self { registry }
    }

    /// Whether `package_id` is currently installed.
    ///
    /// An empty id is never installed and is not sent to the registry.
    /// Registry errors other than "not found" abort the caller's attempt.
    #[instrument(skip(self))]
    pub async fn is_installed(&self, package_id: &str) -> AgentResult<bool> {
        if package_id.is_empty() {
            return Ok(false);
        }

        match self.registry.package_info(package_id).await {
            Ok(info) => {
                debug!(detail = ?info.detail, "package installed");
                Ok(true)
            }
            Err(RegistryError::NotFound(_)) => Ok(false),
            Err(err) => Err(AgentError::InstallQuery(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PackageInfo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedRegistry {
        answer: Result<PackageInfo, RegistryError>,
        queries: AtomicU32,
    }

    impl FixedRegistry {
        fn new(answer: Result<PackageInfo, RegistryError>) -> Self {
            Self {
                answer,
                queries: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PackageRegistry for FixedRegistry {
        async fn package_info(&self, _package_id: &str) -> Result<PackageInfo, RegistryError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }

        async fn launch_entry(&self, package_id: &str) -> Result<String, RegistryError> {
            Ok(package_id.to_string())
        }
    }

    #[tokio::test]
    async fn test_installed_package() {
        let registry = Arc::new(FixedRegistry::new(Ok(PackageInfo {
            package_id: "com.example.app".to_string(),
            detail: Some("/data/app/base.apk".to_string()),
        })));
        let checker = InstallChecker::new(registry);
        assert!(checker.is_installed("com.example.app").await.unwrap());
    }

    #[tokio::test]
    async fn test_not_found_maps_to_false() {
        let registry = Arc::new(FixedRegistry::new(Err(RegistryError::NotFound(
            "com.example.app".to_string(),
        ))));
        let checker = InstallChecker::new(registry);
        assert!(!checker.is_installed("com.example.app").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_id_is_never_queried() {
        let registry = Arc::new(FixedRegistry::new(Ok(PackageInfo {
            package_id: String::new(),
            detail: None,
        })));
        let checker = InstallChecker::new(registry.clone());

        assert!(!checker.is_installed("").await.unwrap());
        assert_eq!(registry.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_registry_errors_propagate() {
        let registry = Arc::new(FixedRegistry::new(Err(RegistryError::Query(
            "exit status 2".to_string(),
        ))));
        let checker = InstallChecker::new(registry);

        let err = checker.is_installed("com.example.app").await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::InstallQuery(RegistryError::Query(_))
        ));
    }
}
