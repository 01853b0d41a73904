//! Domain models for the install agent.

pub mod config;
pub mod download;
pub mod install;
pub mod loop_state;
pub mod remote_config;

pub use config::{
    AgentConfig, Config, DownloadConfig, LoggingConfig, PlatformConfig, RemoteConfigSource,
};
pub use download::{artifact_path, DownloadCompletion, DownloadId, DownloadStatus, DownloadTask};
pub use install::{
    CapabilitySetting, InstallCapability, IntentData, IntentFlags, LaunchIntent, ViewIntent,
    PACKAGE_ARCHIVE_MIME,
};
pub use loop_state::{DisabledReason, LoopOutcome, LoopReport, LoopState};
pub use remote_config::RemoteConfig;
