//! Common test utilities for integration tests
//!
//! Scripted in-memory implementations of the host ports, plus a harness that
//! assembles a convergence loop from them.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use install_agent::application::{AgentContext, Collaborators, ConvergenceLoop, LoopSettings};
use install_agent::domain::errors::{DownloadError, FetchError, LaunchError, RegistryError};
use install_agent::domain::models::{
    DownloadCompletion, DownloadId, DownloadTask, InstallCapability, LaunchIntent, ViewIntent,
    PACKAGE_ARCHIVE_MIME,
};
use install_agent::domain::ports::{
    ActionLauncher, ArtifactStore, ContentProvider, DownloadHandle, DownloadSubsystem,
    LifecycleGrant, PackageInfo, PackageRegistry, RemoteStore,
};
use install_agent::services::DownloadPolicy;

pub const PACKAGE_ID: &str = "com.example.app";

/// The reference remote document
pub fn app_document() -> Value {
    json!({
        "enabled": true,
        "package_name": PACKAGE_ID,
        "name": "App",
        "url": "https://host/app.pkg",
    })
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Remote store answering from a JSON object; keys in `hang` never answer
#[derive(Default)]
pub struct TableStore {
    values: HashMap<String, Value>,
    hang: HashSet<String>,
    pub reads: AtomicUsize,
}

impl TableStore {
    pub fn new(document: Value) -> Self {
        let values = match document {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn hanging_on(mut self, key: &str) -> Self {
        self.hang.insert(key.to_string());
        self
    }
}

#[async_trait]
impl RemoteStore for TableStore {
    async fn read(&self, key: &str) -> Result<Option<Value>, FetchError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.hang.contains(key) {
            std::future::pending::<()>().await;
        }
        Ok(self.values.get(key).cloned())
    }
}

/// Registry replaying scripted install states; installed once the script runs out
#[derive(Default)]
pub struct ScriptedRegistry {
    answers: Mutex<VecDeque<Result<bool, RegistryError>>>,
    exhausted: Option<bool>,
    pub queries: AtomicUsize,
}

impl ScriptedRegistry {
    pub fn new(answers: Vec<Result<bool, RegistryError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            exhausted: None,
            queries: AtomicUsize::new(0),
        }
    }

    /// Registry that never reports the package as installed
    pub fn never_installed() -> Self {
        Self {
            exhausted: Some(false),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PackageRegistry for ScriptedRegistry {
    async fn package_info(&self, package_id: &str) -> Result<PackageInfo, RegistryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.exhausted.unwrap_or(true)));
        if answer? {
            Ok(PackageInfo {
                package_id: package_id.to_string(),
                detail: None,
            })
        } else {
            Err(RegistryError::NotFound(package_id.to_string()))
        }
    }

    async fn launch_entry(&self, package_id: &str) -> Result<String, RegistryError> {
        Ok(format!("{package_id}/.MainActivity"))
    }
}

/// Artifact store remembering the paths the fake download subsystem wrote
#[derive(Default)]
pub struct MemoryArtifacts {
    paths: Mutex<HashSet<PathBuf>>,
}

impl MemoryArtifacts {
    pub fn insert(&self, path: &Path) {
        self.paths.lock().unwrap().insert(path.to_path_buf());
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifacts {
    async fn exists(&self, path: &Path) -> bool {
        self.paths.lock().unwrap().contains(path)
    }
}

/// Download subsystem completing every submission immediately
pub struct FakeDownloads {
    artifacts: Arc<MemoryArtifacts>,
    fail: bool,
    pub submissions: AtomicUsize,
}

impl FakeDownloads {
    pub fn new(artifacts: Arc<MemoryArtifacts>) -> Self {
        Self {
            artifacts,
            fail: false,
            submissions: AtomicUsize::new(0),
        }
    }

    pub fn failing(artifacts: Arc<MemoryArtifacts>) -> Self {
        Self {
            fail: true,
            ..Self::new(artifacts)
        }
    }
}

#[async_trait]
impl DownloadSubsystem for FakeDownloads {
    async fn submit(&self, task: &DownloadTask) -> Result<DownloadHandle, DownloadError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        let id = DownloadId::new();
        let (tx, rx) = oneshot::channel();
        let completion = if self.fail {
            DownloadCompletion::failed(id, "HTTP 503")
        } else {
            self.artifacts.insert(&task.destination);
            DownloadCompletion::successful(id)
        };
        let _ = tx.send(completion);
        Ok(DownloadHandle::new(id, rx))
    }
}

#[derive(Default)]
pub struct RecordingProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ContentProvider for RecordingProvider {
    async fn uri_for_file(&self, authority: &str, path: &Path) -> Result<String, LaunchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("content://{authority}/{name}"))
    }
}

#[derive(Default)]
pub struct RecordingLauncher {
    pub views: Mutex<Vec<ViewIntent>>,
    pub launches: Mutex<Vec<LaunchIntent>>,
}

impl RecordingLauncher {
    pub fn views(&self) -> Vec<ViewIntent> {
        self.views.lock().unwrap().clone()
    }

    pub fn launches(&self) -> Vec<LaunchIntent> {
        self.launches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionLauncher for RecordingLauncher {
    async fn view(&self, intent: &ViewIntent) -> Result<(), LaunchError> {
        self.views.lock().unwrap().push(intent.clone());
        Ok(())
    }

    async fn launch(&self, intent: &LaunchIntent) -> Result<(), LaunchError> {
        self.launches.lock().unwrap().push(intent.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingGrant {
    pub releases: AtomicUsize,
}

impl LifecycleGrant for CountingGrant {
    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fakes wired into one agent context
pub struct Harness {
    pub ctx: Arc<AgentContext>,
    pub store: Arc<TableStore>,
    pub registry: Arc<ScriptedRegistry>,
    pub artifacts: Arc<MemoryArtifacts>,
    pub downloads: Arc<FakeDownloads>,
    pub provider: Arc<RecordingProvider>,
    pub launcher: Arc<RecordingLauncher>,
    pub grant: Arc<CountingGrant>,
}

impl Harness {
    pub fn new(store: TableStore, registry: ScriptedRegistry, capability: InstallCapability) -> Self {
        let artifacts = Arc::new(MemoryArtifacts::default());
        let downloads = Arc::new(FakeDownloads::new(Arc::clone(&artifacts)));
        Self::with_downloads(store, registry, capability, artifacts, downloads)
    }

    pub fn with_downloads(
        store: TableStore,
        registry: ScriptedRegistry,
        capability: InstallCapability,
        artifacts: Arc<MemoryArtifacts>,
        downloads: Arc<FakeDownloads>,
    ) -> Self {
        let grant = Arc::new(CountingGrant::default());
        let ctx = Arc::new(AgentContext::new(
            "install-agent",
            "/data/agent/downloads",
            "apk",
            capability,
            Arc::clone(&grant) as Arc<dyn LifecycleGrant>,
        ));
        Self {
            ctx,
            store: Arc::new(store),
            registry: Arc::new(registry),
            artifacts,
            downloads,
            provider: Arc::new(RecordingProvider::default()),
            launcher: Arc::new(RecordingLauncher::default()),
            grant,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            remote_store: Arc::clone(&self.store) as Arc<dyn RemoteStore>,
            artifact_store: Arc::clone(&self.artifacts) as Arc<dyn ArtifactStore>,
            downloads: Arc::clone(&self.downloads) as Arc<dyn DownloadSubsystem>,
            registry: Arc::clone(&self.registry) as Arc<dyn PackageRegistry>,
            content_provider: Arc::clone(&self.provider) as Arc<dyn ContentProvider>,
            launcher: Arc::clone(&self.launcher) as Arc<dyn ActionLauncher>,
        }
    }

    pub fn build(&self, settings: LoopSettings) -> ConvergenceLoop {
        ConvergenceLoop::new(Arc::clone(&self.ctx), self.collaborators(), settings)
    }

    pub fn queries(&self) -> usize {
        self.registry.queries.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> usize {
        self.downloads.submissions.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.grant.releases.load(Ordering::SeqCst)
    }
}

/// Loop settings with millisecond waits
pub fn fast_settings() -> LoopSettings {
    LoopSettings {
        poll_interval: Duration::from_millis(10),
        read_timeout: Duration::from_secs(1),
        download: DownloadPolicy {
            completion_timeout: Duration::from_secs(1),
            max_retries: 0,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        },
        strict_config: false,
        package_mime: PACKAGE_ARCHIVE_MIME.to_string(),
    }
}
