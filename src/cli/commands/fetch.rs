//! Implementation of the `install-agent fetch` command.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::cli::output::{or_unset, output, CommandOutput};
use crate::domain::models::{artifact_path, Config, RemoteConfig};
use crate::infrastructure::remote::HttpRemoteStore;
use crate::services::ConfigClient;

#[derive(Args, Debug)]
pub struct FetchArgs {}

#[derive(Debug, serde::Serialize)]
pub struct FetchOutput {
    pub enabled: bool,
    pub package_name: String,
    pub name: String,
    pub url: String,
    pub missing: Vec<String>,
    pub artifact_path: Option<String>,
}

impl FetchOutput {
    fn new(remote: &RemoteConfig, config: &Config) -> Self {
        let artifact_path = (!remote.display_name.is_empty()).then(|| {
            artifact_path(
                &config.agent.downloads_dir,
                &remote.display_name,
                &config.agent.artifact_extension,
            )
            .display()
            .to_string()
        });
        Self {
            enabled: remote.enabled,
            package_name: remote.package_id.clone(),
            name: remote.display_name.clone(),
            url: remote.download_url.clone(),
            missing: remote.missing_fields().into_iter().map(str::to_string).collect(),
            artifact_path,
        }
    }
}

impl CommandOutput for FetchOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Enabled:      {}", if self.enabled { "yes" } else { "no" }),
            format!("Package:      {}", or_unset(&self.package_name)),
            format!("Name:         {}", or_unset(&self.name)),
            format!("URL:          {}", or_unset(&self.url)),
        ];
        if let Some(ref path) = self.artifact_path {
            lines.push(format!("Artifact:     {path}"));
        }
        if !self.missing.is_empty() {
            lines.push(format!("\nMissing fields: {}", self.missing.join(", ")));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(_args: FetchArgs, config: Config, json_mode: bool) -> Result<()> {
    let store = HttpRemoteStore::new(&config.remote).context("Failed to build remote store client")?;
    let client = ConfigClient::new(
        Arc::new(store),
        Duration::from_secs(config.remote.timeout_secs),
        CancellationToken::new(),
    );

    let remote = client.fetch().await;
    output(&FetchOutput::new(&remote, &config), json_mode);
    Ok(())
}
