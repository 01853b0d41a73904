//! Process-wide agent context.
//!
//! Built once at startup and handed by reference to every component
//! constructor. Holds the resolved install capability, the cancellation token
//! shared by all suspension points, and the lifecycle grant released on the
//! terminal transition.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

use crate::domain::models::{Config, InstallCapability};
use crate::domain::ports::{LifecycleGrant, NoopGrant};

pub struct AgentContext {
    agent_id: String,
    downloads_dir: PathBuf,
    artifact_extension: String,
    capability: InstallCapability,
    cancel: CancellationToken,
    grant: Arc<dyn LifecycleGrant>,
    released: AtomicBool,
}

impl AgentContext {
    pub fn new(
        agent_id: impl Into<String>,
        downloads_dir: impl Into<PathBuf>,
        artifact_extension: impl Into<String>,
        capability: InstallCapability,
        grant: Arc<dyn LifecycleGrant>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            downloads_dir: downloads_dir.into(),
            artifact_extension: artifact_extension.into(),
            capability,
            cancel: CancellationToken::new(),
            grant,
            released: AtomicBool::new(false),
        }
    }

    /// Context for `config`, resolving the install capability once.
    pub fn from_config(config: &Config, grant: Arc<dyn LifecycleGrant>) -> Self {
        let capability =
            InstallCapability::resolve(config.platform.capability, config.platform.api_level);
        Self::new(
            config.agent.id.clone(),
            config.agent.downloads_dir.clone(),
            config.agent.artifact_extension.clone(),
            capability,
            grant,
        )
    }

    /// Context holding no lifecycle resource, for one-shot commands.
    pub fn detached(config: &Config) -> Self {
        Self::from_config(config, Arc::new(NoopGrant))
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Authority under which the agent's content provider shares files.
    pub fn provider_authority(&self) -> String {
        format!("{}.provider", self.agent_id)
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    pub fn artifact_extension(&self) -> &str {
        &self.artifact_extension
    }

    pub fn capability(&self) -> InstallCapability {
        self.capability
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolves once the context is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Request a clean shutdown of everything waiting on this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Release the lifecycle grant. Only the first call has an effect.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        debug!(agent_id = %self.agent_id, "releasing lifecycle grant");
        self.grant.release();
        true
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("agent_id", &self.agent_id)
            .field("downloads_dir", &self.downloads_dir)
            .field("capability", &self.capability)
            .field("cancelled", &self.is_cancelled())
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CapabilitySetting;
    use std::sync::atomic::AtomicU32;

    #[derive(Default)]
    struct CountingGrant(AtomicU32);

    impl LifecycleGrant for CountingGrant {
        fn release(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_release_is_idempotent() {
        let grant = Arc::new(CountingGrant::default());
        let ctx = AgentContext::new(
            "agent",
            "/tmp/downloads",
            "apk",
            InstallCapability::Scoped,
            grant.clone(),
        );

        assert!(ctx.release());
        assert!(!ctx.release());
        assert!(ctx.is_released());
        assert_eq!(grant.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_resolves_capability() {
        let mut config = Config::default();
        config.platform.capability = CapabilitySetting::Auto;
        config.platform.api_level = Some(21);
        config.agent.id = "com.example.agent".to_string();

        let ctx = AgentContext::detached(&config);
        assert_eq!(ctx.capability(), InstallCapability::Legacy);
        assert_eq!(ctx.provider_authority(), "com.example.agent.provider");
    }

    #[test]
    fn test_cancel_propagates_to_token() {
        let ctx = AgentContext::detached(&Config::default());
        let token = ctx.cancellation_token();
        assert!(!token.is_cancelled());
        ctx.cancel();
        assert!(token.is_cancelled());
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves_after_cancel() {
        let ctx = AgentContext::detached(&Config::default());
        let waiting = tokio::time::timeout(std::time::Duration::from_millis(20), ctx.cancelled()).await;
        assert!(waiting.is_err());

        ctx.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), ctx.cancelled())
            .await
            .unwrap();
    }
}
