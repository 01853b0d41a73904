use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::install::{CapabilitySetting, PACKAGE_ARCHIVE_MIME};

/// Main configuration structure for the install agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Agent identity and loop behaviour
    #[serde(default)]
    pub agent: AgentConfig,

    /// Remote configuration store
    #[serde(default)]
    pub remote: RemoteConfigSource,

    /// Artifact download policy
    #[serde(default)]
    pub download: DownloadConfig,

    /// Host platform integration
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Agent identity and loop behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AgentConfig {
    /// Identifier of the agent itself; the content provider authority is
    /// `<id>.provider`
    #[serde(default = "default_agent_id")]
    pub id: String,

    /// Fixed delay between convergence attempts, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Directory private to the agent where artifacts are stored
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,

    /// Platform package extension appended to the display name
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,

    /// Stop at the gate when the remote document is enabled but incomplete
    #[serde(default)]
    pub strict_config: bool,

    /// Pid file guarding against a second agent instance
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
}

fn default_agent_id() -> String {
    "install-agent".to_string()
}

const fn default_poll_interval_secs() -> u64 {
    10
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from(".install-agent/downloads")
}

fn default_artifact_extension() -> String {
    "apk".to_string()
}

fn default_lock_file() -> PathBuf {
    PathBuf::from(".install-agent/agent.pid")
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: default_agent_id(),
            poll_interval_secs: default_poll_interval_secs(),
            downloads_dir: default_downloads_dir(),
            artifact_extension: default_artifact_extension(),
            strict_config: false,
            lock_file: default_lock_file(),
        }
    }
}

/// Remote key-value store holding the desired state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RemoteConfigSource {
    /// Base URL of the store's REST endpoint
    #[serde(default = "default_remote_base_url")]
    pub base_url: String,

    /// Root collection holding the document
    #[serde(default = "default_remote_root")]
    pub root: String,

    /// Optional access token, sent as the `auth` query parameter
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Timeout for a single value read, in seconds
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_remote_base_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_remote_root() -> String {
    "app".to_string()
}

const fn default_remote_timeout_secs() -> u64 {
    10
}

impl Default for RemoteConfigSource {
    fn default() -> Self {
        Self {
            base_url: default_remote_base_url(),
            root: default_remote_root(),
            auth_token: None,
            timeout_secs: default_remote_timeout_secs(),
        }
    }
}

/// Artifact download policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DownloadConfig {
    /// Maximum wait for one download to complete, in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a failed or timed out download
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_download_timeout_secs() -> u64 {
    600
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    2_000
}

const fn default_max_backoff_ms() -> u64 {
    60_000
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_download_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Host platform integration
///
/// Command templates are split on whitespace before placeholder substitution;
/// a token whose placeholder has no value is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlatformConfig {
    /// Install capability: auto, scoped or legacy
    #[serde(default)]
    pub capability: CapabilitySetting,

    /// Platform API level used by `auto` capability resolution
    #[serde(default)]
    pub api_level: Option<u32>,

    /// Package query; `{package}` is substituted
    #[serde(default = "default_query_command")]
    pub query_command: String,

    /// Exit code of `query_command` meaning "not installed"
    #[serde(default = "default_not_found_exit_code")]
    pub not_found_exit_code: i32,

    /// Optional launch entry resolver; first stdout line is the entry point
    #[serde(default)]
    pub entry_command: Option<String>,

    /// Install view action; `{data}`, `{mime}` and `{flags}` are substituted and
    /// the `{intent_args}` token expands to the intent's activity-manager arguments
    #[serde(default = "default_view_command")]
    pub view_command: String,

    /// Foreground launch; `{package}` and `{entry}` are substituted
    #[serde(default = "default_launch_command")]
    pub launch_command: String,

    /// Root directory exposed through the content provider
    #[serde(default = "default_shared_root")]
    pub shared_root: PathBuf,

    /// Mime type sent on the legacy install path
    #[serde(default = "default_package_mime")]
    pub package_mime: String,
}

fn default_query_command() -> String {
    "pm path {package}".to_string()
}

const fn default_not_found_exit_code() -> i32 {
    1
}

fn default_view_command() -> String {
    "am start -a android.intent.action.VIEW -d {data} {intent_args}".to_string()
}

fn default_launch_command() -> String {
    "monkey -p {package} -c android.intent.category.LAUNCHER 1".to_string()
}

fn default_shared_root() -> PathBuf {
    PathBuf::from(".install-agent")
}

fn default_package_mime() -> String {
    PACKAGE_ARCHIVE_MIME.to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            capability: CapabilitySetting::default(),
            api_level: None,
            query_command: default_query_command(),
            not_found_exit_code: default_not_found_exit_code(),
            entry_command: None,
            view_command: default_view_command(),
            launch_command: default_launch_command(),
            shared_root: default_shared_root(),
            package_mime: default_package_mime(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log to the console (stderr)
    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// Rotation policy: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_rotation() -> String {
    "daily".to_string()
}

const fn default_retention_days() -> u32 {
    7
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_console: default_true(),
            rotation: default_rotation(),
            retention_days: default_retention_days(),
        }
    }
}
