//! Convergence loop states and the run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the loop stopped at the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "missing")]
pub enum DisabledReason {
    /// The remote `enabled` switch is off or could not be read.
    RemoteSwitchOff,
    /// Enabled, but required fields were empty and strict gating is on.
    IncompleteConfig(Vec<String>),
}

/// State of the convergence state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum LoopState {
    Init,
    Gated,
    Polling { attempt: u32 },
    Converged,
    Disabled(DisabledReason),
    Cancelled,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::Disabled(_) | Self::Cancelled)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Gated => f.write_str("gated"),
            Self::Polling { attempt } => write!(f, "polling(attempt {attempt})"),
            Self::Converged => f.write_str("converged"),
            Self::Disabled(_) => f.write_str("disabled"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Terminal result of one agent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopOutcome {
    Converged,
    Disabled(DisabledReason),
    Cancelled,
}

impl LoopOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::Disabled(_) => "disabled",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    pub package_id: String,
    /// Download + install attempts started.
    pub attempts: u32,
    pub install_query_failures: u32,
    pub download_failures: u32,
    pub launched: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl LoopReport {
    pub(crate) fn start(package_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            outcome: LoopOutcome::Cancelled,
            package_id: package_id.into(),
            attempts: 0,
            install_query_failures: 0,
            download_failures: 0,
            launched: false,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(mut self, outcome: LoopOutcome) -> Self {
        self.outcome = outcome;
        self.finished_at = Utc::now();
        self
    }
}
