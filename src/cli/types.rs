//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{check::CheckArgs, config::ConfigArgs, fetch::FetchArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(name = "install-agent")]
#[command(about = "Install agent - keeps a remotely configured package installed and running", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .install-agent/config.yaml and local.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the agent until the target package is installed and launched
    Run(RunArgs),

    /// Fetch the remote configuration once and print it
    Fetch(FetchArgs),

    /// Check whether a package is installed
    Check(CheckArgs),

    /// Print the resolved configuration
    Config(ConfigArgs),
}
