//! Install agent entry point.

use anyhow::Result;
use clap::Parser;

use install_agent::cli::{commands, handle_error, Cli, Commands};
use install_agent::domain::models::Config;
use install_agent::infrastructure::config::ConfigLoader;
use install_agent::infrastructure::logging::{LogConfig, LogRetention, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    let config = load_config(&cli).unwrap_or_else(|err| handle_error(err, json));
    let logger =
        LoggerImpl::init(&LogConfig::from(&config.logging)).unwrap_or_else(|err| handle_error(err, json));

    if let Some(ref log_dir) = config.logging.log_dir {
        let retention = LogRetention::new(config.logging.retention_days);
        if let Err(err) = retention.cleanup_old_logs(log_dir).await {
            tracing::warn!(error = %err, "log retention cleanup failed");
        }
    }

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, config, json).await,
        Commands::Fetch(args) => commands::fetch::execute(args, config, json).await,
        Commands::Check(args) => commands::check::execute(args, config, json).await,
        Commands::Config(args) => commands::config::execute(args, config, json).await,
    };

    if let Err(err) = result {
        // Flush buffered file logs before exiting
        drop(logger);
        handle_error(err, json);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}
