//! Implementation of the `install-agent check` command.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::platform::CommandPackageRegistry;
use crate::services::InstallChecker;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Package identifier to look up
    pub package: String,
}

#[derive(Debug, serde::Serialize)]
pub struct CheckOutput {
    pub package: String,
    pub installed: bool,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        if self.installed {
            format!("{} is installed", self.package)
        } else {
            format!("{} is not installed", self.package)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CheckArgs, config: Config, json_mode: bool) -> Result<()> {
    let checker = InstallChecker::new(Arc::new(CommandPackageRegistry::new(&config.platform)));
    let installed = checker.is_installed(&args.package).await?;

    output(
        &CheckOutput {
            package: args.package,
            installed,
        },
        json_mode,
    );
    Ok(())
}
