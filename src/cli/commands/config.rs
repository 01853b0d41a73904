//! Implementation of the `install-agent config` command.

use anyhow::Result;
use clap::Args;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, InstallCapability};

const REDACTED: &str = "[REDACTED]";

#[derive(Args, Debug)]
pub struct ConfigArgs {}

#[derive(Debug, serde::Serialize)]
pub struct ConfigOutput {
    pub capability: InstallCapability,
    pub config: Config,
}

impl ConfigOutput {
    /// Resolved configuration with credentials removed
    pub fn new(mut config: Config) -> Self {
        if config.remote.auth_token.is_some() {
            config.remote.auth_token = Some(REDACTED.to_string());
        }
        let capability =
            InstallCapability::resolve(config.platform.capability, config.platform.api_level);
        Self { capability, config }
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        let yaml = serde_yaml::to_string(&self.config).unwrap_or_default();
        format!("# resolved install capability: {}\n{yaml}", self.capability)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(_args: ConfigArgs, config: Config, json_mode: bool) -> Result<()> {
    output(&ConfigOutput::new(config), json_mode);
    Ok(())
}
