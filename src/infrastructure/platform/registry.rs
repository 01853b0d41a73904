use async_trait::async_trait;
use tracing::{debug, instrument};

use super::command::{run_captured, CommandTemplate, TemplateVars};
use crate::domain::errors::RegistryError;
use crate::domain::models::PlatformConfig;
use crate::domain::ports::{PackageInfo, PackageRegistry};

/// Package registry answering through host commands
///
/// `query_command` exits 0 for an installed package and with
/// `not_found_exit_code` for an absent one; anything else is a failed query.
pub struct CommandPackageRegistry {
    query: CommandTemplate,
    not_found_exit_code: i32,
    entry: Option<CommandTemplate>,
}

impl CommandPackageRegistry {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            query: CommandTemplate::parse(&config.query_command),
            not_found_exit_code: config.not_found_exit_code,
            entry: config
                .entry_command
                .as_deref()
                .map(CommandTemplate::parse)
                .filter(|template| !template.is_empty()),
        }
    }
}

#[async_trait]
impl PackageRegistry for CommandPackageRegistry {
    #[instrument(skip(self))]
    async fn package_info(&self, package_id: &str) -> Result<PackageInfo, RegistryError> {
        let vars = TemplateVars::new().set("package", package_id);
        let command = self
            .query
            .command(&vars)
            .ok_or_else(|| RegistryError::Query("query command is empty".to_string()))?;

        let output = run_captured(command)
            .await
            .map_err(|e| RegistryError::Query(format!("failed to run query command: {e}")))?;

        match output.status.code() {
            Some(0) => {
                let detail = first_line(&output.stdout);
                debug!(detail = ?detail, "package installed");
                Ok(PackageInfo {
                    package_id: package_id.to_string(),
                    detail,
                })
            }
            Some(code) if code == self.not_found_exit_code => {
                Err(RegistryError::NotFound(package_id.to_string()))
            }
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let reason = match code {
                    Some(code) => format!("query exited with {code}: {}", stderr.trim()),
                    None => "query terminated by signal".to_string(),
                };
                Err(RegistryError::Query(reason))
            }
        }
    }

    #[instrument(skip(self))]
    async fn launch_entry(&self, package_id: &str) -> Result<String, RegistryError> {
        let Some(ref entry) = self.entry else {
            return Ok(package_id.to_string());
        };

        let vars = TemplateVars::new().set("package", package_id);
        let command = entry
            .command(&vars)
            .ok_or_else(|| RegistryError::NoLaunchEntry(package_id.to_string()))?;
        let output = run_captured(command)
            .await
            .map_err(|e| RegistryError::Query(format!("failed to run entry command: {e}")))?;

        if !output.status.success() {
            return Err(RegistryError::NoLaunchEntry(package_id.to_string()));
        }
        first_line(&output.stdout).ok_or_else(|| RegistryError::NoLaunchEntry(package_id.to_string()))
    }
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
