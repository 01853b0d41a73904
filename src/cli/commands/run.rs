//! Implementation of the `install-agent run` command.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::{AgentContext, ConvergenceLoop, LoopSettings};
use crate::cli::output::{or_unset, output, CommandOutput};
use crate::domain::models::{Config, DisabledReason, LoopOutcome, LoopReport};
use crate::domain::ports::{LifecycleGrant, NoopGrant};
use crate::infrastructure::platform::PidFileGrant;
use crate::infrastructure::setup;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the delay between attempts, in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Do not take the single-instance pid file
    #[arg(long)]
    pub no_lock: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct RunOutput {
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub package_id: String,
    pub attempts: u32,
    pub install_query_failures: u32,
    pub download_failures: u32,
    pub launched: bool,
    pub duration_ms: i64,
}

impl From<&LoopReport> for RunOutput {
    fn from(report: &LoopReport) -> Self {
        let detail = match report.outcome {
            LoopOutcome::Disabled(DisabledReason::RemoteSwitchOff) => {
                Some("remote switch is off".to_string())
            }
            LoopOutcome::Disabled(DisabledReason::IncompleteConfig(ref missing)) => {
                Some(format!("remote configuration is missing: {}", missing.join(", ")))
            }
            LoopOutcome::Converged | LoopOutcome::Cancelled => None,
        };
        Self {
            outcome: report.outcome.as_str().to_string(),
            detail,
            package_id: report.package_id.clone(),
            attempts: report.attempts,
            install_query_failures: report.install_query_failures,
            download_failures: report.download_failures,
            launched: report.launched,
            duration_ms: (report.finished_at - report.started_at).num_milliseconds(),
        }
    }
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Agent finished: {}", self.outcome)];
        if let Some(ref detail) = self.detail {
            lines.push(format!("  {detail}"));
        }
        lines.push(format!("  Package:          {}", or_unset(&self.package_id)));
        lines.push(format!("  Attempts:         {}", self.attempts));
        lines.push(format!("  Query failures:   {}", self.install_query_failures));
        lines.push(format!("  Download failures: {}", self.download_failures));
        lines.push(format!("  Launched:         {}", if self.launched { "yes" } else { "no" }));
        lines.push(format!("  Duration:         {:.1}s", self.duration_ms as f64 / 1000.0));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, mut config: Config, json_mode: bool) -> Result<()> {
    if let Some(secs) = args.poll_interval {
        config.agent.poll_interval_secs = secs.max(1);
    }

    setup::prepare_directories(&config)?;
    let collaborators = setup::build_collaborators(&config)?;

    let grant: Arc<dyn LifecycleGrant> = if args.no_lock {
        Arc::new(NoopGrant)
    } else {
        let grant = PidFileGrant::acquire(&config.agent.lock_file).with_context(|| {
            format!("Failed to acquire {}", config.agent.lock_file.display())
        })?;
        Arc::new(grant)
    };

    let ctx = Arc::new(AgentContext::from_config(&config, grant));
    info!(
        agent_id = %ctx.agent_id(),
        capability = %ctx.capability(),
        poll_interval_secs = config.agent.poll_interval_secs,
        "starting install agent"
    );

    let signals = tokio::spawn(cancel_on_signal(ctx.cancellation_token()));
    let agent = ConvergenceLoop::new(Arc::clone(&ctx), collaborators, LoopSettings::from(&config));
    let report = agent.run().await;
    signals.abort();

    output(&RunOutput::from(&report), json_mode);
    Ok(())
}

/// Cancel `token` on SIGINT or SIGTERM
async fn cancel_on_signal(token: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut interrupt, mut terminate) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(interrupt), Ok(terminate)) => (interrupt, terminate),
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "failed to install signal handlers; the agent cannot be interrupted");
                return;
            }
        };

    tokio::select! {
        _ = interrupt.recv() => info!("received SIGINT, stopping agent"),
        _ = terminate.recv() => info!("received SIGTERM, stopping agent"),
    }
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn report(outcome: LoopOutcome) -> LoopReport {
        let started_at = Utc::now();
        LoopReport {
            outcome,
            package_id: "com.example.app".to_string(),
            attempts: 3,
            install_query_failures: 1,
            download_failures: 0,
            launched: true,
            started_at,
            finished_at: started_at + Duration::milliseconds(1500),
        }
    }

    #[test]
    fn test_converged_output() {
        let output = RunOutput::from(&report(LoopOutcome::Converged));
        assert_eq!(output.outcome, "converged");
        assert_eq!(output.duration_ms, 1500);
        assert!(output.detail.is_none());

        let human = output.to_human();
        assert!(human.contains("Agent finished: converged"));
        assert!(human.contains("com.example.app"));
        assert!(human.contains("1.5s"));
    }

    #[test]
    fn test_incomplete_config_detail() {
        let output = RunOutput::from(&report(LoopOutcome::Disabled(
            DisabledReason::IncompleteConfig(vec!["url".to_string()]),
        )));
        assert_eq!(output.outcome, "disabled");
        assert_eq!(
            output.detail.as_deref(),
            Some("remote configuration is missing: url")
        );

        let json = output.to_json();
        assert_eq!(json["outcome"], "disabled");
        assert_eq!(json["attempts"], 3);
    }
}
