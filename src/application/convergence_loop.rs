//! ConvergenceLoop - drives the device towards "target installed and running"
//!
//! State machine:
//! - `Init`: the remote document is fetched exactly once
//! - `Gated`: a disabled document stops the agent without side effects
//! - `Polling`: check installed state, otherwise download + install, then wait
//!   a fixed interval and poll again
//! - `Converged`: launch the target and release the lifecycle grant
//!
//! Every suspension point races the context's cancellation token.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, field, info, info_span, warn, Instrument, Span};

use crate::application::AgentContext;
use crate::domain::errors::DownloadError;
use crate::domain::models::{
    Config, DisabledReason, DownloadTask, LaunchIntent, LoopOutcome, LoopReport, LoopState,
    RemoteConfig,
};
use crate::domain::ports::{
    ActionLauncher, ArtifactStore, ContentProvider, DownloadSubsystem, PackageRegistry,
    RemoteStore,
};
use crate::services::{ConfigClient, DownloadPolicy, Downloader, InstallChecker, InstallDispatcher};

/// Host adapters the loop is assembled from.
#[derive(Clone)]
pub struct Collaborators {
    pub remote_store: Arc<dyn RemoteStore>,
    pub artifact_store: Arc<dyn ArtifactStore>,
    pub downloads: Arc<dyn DownloadSubsystem>,
    pub registry: Arc<dyn PackageRegistry>,
    pub content_provider: Arc<dyn ContentProvider>,
    pub launcher: Arc<dyn ActionLauncher>,
}

/// Tunables of one loop instance.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Fixed wait between attempts
    pub poll_interval: Duration,
    /// Timeout of each remote field read
    pub read_timeout: Duration,
    pub download: DownloadPolicy,
    /// Stop at the gate when enabled but incomplete
    pub strict_config: bool,
    /// Mime type used on the legacy install path
    pub package_mime: String,
}

impl From<&Config> for LoopSettings {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.agent.poll_interval_secs),
            read_timeout: Duration::from_secs(config.remote.timeout_secs),
            download: DownloadPolicy::from(&config.download),
            strict_config: config.agent.strict_config,
            package_mime: config.platform.package_mime.clone(),
        }
    }
}

pub struct ConvergenceLoop {
    ctx: Arc<AgentContext>,
    settings: LoopSettings,
    config_client: ConfigClient,
    checker: InstallChecker,
    downloader: Downloader,
    dispatcher: InstallDispatcher,
    registry: Arc<dyn PackageRegistry>,
    launcher: Arc<dyn ActionLauncher>,
    state: Arc<RwLock<LoopState>>,
}

impl ConvergenceLoop {
    pub fn new(ctx: Arc<AgentContext>, collaborators: Collaborators, settings: LoopSettings) -> Self {
        let cancel = ctx.cancellation_token();
        let config_client = ConfigClient::new(
            collaborators.remote_store,
            settings.read_timeout,
            cancel.clone(),
        );
        let checker = InstallChecker::new(Arc::clone(&collaborators.registry));
        let downloader = Downloader::new(
            collaborators.artifact_store,
            collaborators.downloads,
            settings.download.clone(),
            cancel,
        );
        let dispatcher = InstallDispatcher::new(
            &ctx,
            settings.package_mime.clone(),
            collaborators.content_provider,
            Arc::clone(&collaborators.launcher),
        );

        Self {
            ctx,
            settings,
            config_client,
            checker,
            downloader,
            dispatcher,
            registry: collaborators.registry,
            launcher: collaborators.launcher,
            state: Arc::new(RwLock::new(LoopState::Init)),
        }
    }

    pub async fn state(&self) -> LoopState {
        self.state.read().await.clone()
    }

    /// Run until a terminal state and release the lifecycle grant.
    pub async fn run(&self) -> LoopReport {
        let report = self
            .drive()
            .instrument(info_span!(
                "convergence_loop",
                agent_id = %self.ctx.agent_id(),
                package_id = field::Empty
            ))
            .await;
        self.ctx.release();
        info!(
            outcome = report.outcome.as_str(),
            attempts = report.attempts,
            "convergence loop finished"
        );
        report
    }

    async fn drive(&self) -> LoopReport {
        self.transition(LoopState::Init).await;
        let remote = self.config_client.fetch().await;
        Span::current().record("package_id", remote.package_id.as_str());

        let report = LoopReport::start(remote.package_id.clone());
        if self.ctx.is_cancelled() {
            return self.finish(report, LoopOutcome::Cancelled).await;
        }

        self.transition(LoopState::Gated).await;
        if let Some(reason) = self.gate(&remote) {
            return self.finish(report, LoopOutcome::Disabled(reason)).await;
        }

        self.poll(&remote, report).await
    }

    /// Decide whether the fetched document lets the loop start.
    fn gate(&self, remote: &RemoteConfig) -> Option<DisabledReason> {
        if !remote.enabled {
            info!("remote switch is off, agent disabled");
            return Some(DisabledReason::RemoteSwitchOff);
        }

        let missing = remote.missing_fields();
        if !missing.is_empty() {
            warn!(?missing, "remote config is enabled but incomplete");
            if self.settings.strict_config {
                return Some(DisabledReason::IncompleteConfig(
                    missing.into_iter().map(str::to_string).collect(),
                ));
            }
        }
        None
    }

    async fn poll(&self, remote: &RemoteConfig, mut report: LoopReport) -> LoopReport {
        let task = DownloadTask::for_config(
            remote,
            self.ctx.downloads_dir(),
            self.ctx.artifact_extension(),
        );
        let package_id = remote.package_id.as_str();
        let mut round = 0u32;

        loop {
            round += 1;
            self.transition(LoopState::Polling { attempt: round }).await;

            match self.checker.is_installed(package_id).await {
                Ok(true) => {
                    info!(package_id, rounds = round, "target installed");
                    report.launched = self.launch_target(package_id).await;
                    return self.finish(report, LoopOutcome::Converged).await;
                }
                Ok(false) => {
                    report.attempts += 1;
                    debug!(attempt = report.attempts, "target missing, acquiring artifact");
                    match self.downloader.ensure_local(&task).await {
                        Ok(path) => self.dispatcher.install(&path).await,
                        Err(DownloadError::Cancelled) => {
                            return self.finish(report, LoopOutcome::Cancelled).await;
                        }
                        Err(err) => {
                            report.download_failures += 1;
                            warn!(attempt = report.attempts, error = %err, "artifact acquisition failed");
                        }
                    }
                }
                Err(err) => {
                    report.install_query_failures += 1;
                    warn!(round, error = %err, "install state query failed, retrying next round");
                }
            }

            if !self.wait_interval().await {
                return self.finish(report, LoopOutcome::Cancelled).await;
            }
        }
    }

    /// Sleep the fixed interval; false when cancelled first.
    async fn wait_interval(&self) -> bool {
        tokio::select! {
            () = self.ctx.cancelled() => false,
            () = sleep(self.settings.poll_interval) => true,
        }
    }

    async fn launch_target(&self, package_id: &str) -> bool {
        let entry_point = match self.registry.launch_entry(package_id).await {
            Ok(entry_point) => entry_point,
            Err(err) => {
                warn!(package_id, error = %err, "no launch entry for target");
                return false;
            }
        };

        let intent = LaunchIntent {
            package_id: package_id.to_string(),
            entry_point,
        };
        match self.launcher.launch(&intent).await {
            Ok(()) => {
                info!(package_id, entry_point = %intent.entry_point, "target launched");
                true
            }
            Err(err) => {
                warn!(package_id, error = %err, "failed to launch target");
                false
            }
        }
    }

    async fn finish(&self, report: LoopReport, outcome: LoopOutcome) -> LoopReport {
        let state = match &outcome {
            LoopOutcome::Converged => LoopState::Converged,
            LoopOutcome::Disabled(reason) => LoopState::Disabled(reason.clone()),
            LoopOutcome::Cancelled => LoopState::Cancelled,
        };
        self.transition(state).await;
        report.finish(outcome)
    }

    async fn transition(&self, next: LoopState) {
        let mut state = self.state.write().await;
        debug!(from = %*state, to = %next, "state transition");
        *state = next;
    }
}
