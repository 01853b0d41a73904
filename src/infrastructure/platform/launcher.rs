use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::command::{CommandTemplate, TemplateVars};
use crate::domain::errors::LaunchError;
use crate::domain::models::{LaunchIntent, PlatformConfig, ViewIntent};
use crate::domain::ports::ActionLauncher;

/// Activity-manager flag value for starting in a new task
const NEW_TASK_FLAG: &str = "0x10000000";

/// Extra marking the installer request as coming from a trusted source
const NOT_UNKNOWN_SOURCE_EXTRA: &str = "android.intent.extra.NOT_UNKNOWN_SOURCE";

/// Action launcher spawning host commands
///
/// Commands are started and left running; their exit is only logged.
pub struct CommandActionLauncher {
    view: CommandTemplate,
    launch: CommandTemplate,
}

impl CommandActionLauncher {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            view: CommandTemplate::parse(&config.view_command),
            launch: CommandTemplate::parse(&config.launch_command),
        }
    }
}

#[async_trait]
impl ActionLauncher for CommandActionLauncher {
    #[instrument(skip(self, intent), fields(data = %intent.data.uri()))]
    async fn view(&self, intent: &ViewIntent) -> Result<(), LaunchError> {
        let command = self
            .view
            .command(&view_vars(intent))
            .ok_or_else(|| LaunchError::Spawn("view command is empty".to_string()))?;
        spawn_detached(command, "view")
    }

    #[instrument(skip(self, intent), fields(package_id = %intent.package_id))]
    async fn launch(&self, intent: &LaunchIntent) -> Result<(), LaunchError> {
        let vars = TemplateVars::new()
            .set("package", intent.package_id.as_str())
            .set("entry", intent.entry_point.as_str());
        let command = self
            .launch
            .command(&vars)
            .ok_or_else(|| LaunchError::Spawn("launch command is empty".to_string()))?;
        spawn_detached(command, "launch")
    }
}

fn view_vars(intent: &ViewIntent) -> TemplateVars {
    let flags = intent.flags.names().into_iter().map(str::to_string).collect();
    TemplateVars::new()
        .set("data", intent.data.uri())
        .set_opt("mime", intent.mime_type.as_deref())
        .set_list("flags", flags)
        .set_list("intent_args", intent_args(intent))
}

/// Activity-manager arguments carrying the intent's type, flags and extras
fn intent_args(intent: &ViewIntent) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(ref mime) = intent.mime_type {
        args.extend(["-t".to_string(), mime.clone()]);
    }
    if intent.flags.grant_read_uri {
        args.push("--grant-read-uri-permission".to_string());
    }
    if intent.flags.new_task {
        args.extend(["-f".to_string(), NEW_TASK_FLAG.to_string()]);
    }
    if intent.not_unknown_source {
        args.extend([
            "--ez".to_string(),
            NOT_UNKNOWN_SOURCE_EXTRA.to_string(),
            "true".to_string(),
        ]);
    }
    args
}

fn spawn_detached(mut command: Command, action: &'static str) -> Result<(), LaunchError> {
    let mut child = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| LaunchError::Spawn(format!("{action}: {e}")))?;
    debug!(action, pid = ?child.id(), "platform action started");

    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => debug!(action, "platform action exited"),
            Ok(status) => warn!(action, status = %status, "platform action exited with failure"),
            Err(err) => warn!(action, error = %err, "failed to wait for platform action"),
        }
    });
    Ok(())
}
