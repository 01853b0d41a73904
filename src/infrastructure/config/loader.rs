use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "INSTALL_AGENT_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Agent id cannot be empty")]
    EmptyAgentId,

    #[error("Invalid poll_interval_secs: {0}. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error("Artifact extension cannot be empty")]
    EmptyArtifactExtension,

    #[error("Remote base_url cannot be empty")]
    EmptyRemoteBaseUrl,

    #[error("Remote root cannot be empty")]
    EmptyRemoteRoot,

    #[error("Invalid remote timeout_secs: {0}. Must be at least 1")]
    InvalidRemoteTimeout(u64),

    #[error("Invalid download timeout_secs: {0}. Must be at least 1")]
    InvalidDownloadTimeout(u64),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Platform command '{0}' cannot be empty")]
    EmptyCommand(&'static str),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .install-agent/config.yaml (project config)
    /// 3. .install-agent/local.yaml (local overrides, optional)
    /// 4. Environment variables (INSTALL_AGENT_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Self::base()
            .merge(Yaml::file(".install-agent/config.yaml"))
            .merge(Yaml::file(".install-agent/local.yaml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Self::base()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let agent = &config.agent;
        if agent.id.trim().is_empty() {
            return Err(ConfigError::EmptyAgentId);
        }
        if agent.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval(agent.poll_interval_secs));
        }
        if agent.artifact_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyArtifactExtension);
        }

        let remote = &config.remote;
        if remote.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyRemoteBaseUrl);
        }
        if remote.root.trim().is_empty() {
            return Err(ConfigError::EmptyRemoteRoot);
        }
        if remote.timeout_secs == 0 {
            return Err(ConfigError::InvalidRemoteTimeout(remote.timeout_secs));
        }

        let download = &config.download;
        if download.timeout_secs == 0 {
            return Err(ConfigError::InvalidDownloadTimeout(download.timeout_secs));
        }
        if download.initial_backoff_ms >= download.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                download.initial_backoff_ms,
                download.max_backoff_ms,
            ));
        }

        let platform = &config.platform;
        for (name, command) in [
            ("query_command", &platform.query_command),
            ("view_command", &platform.view_command),
            ("launch_command", &platform.launch_command),
        ] {
            if command.trim().is_empty() {
                return Err(ConfigError::EmptyCommand(name));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}
