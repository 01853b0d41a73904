//! Install agent - converges a device towards a remotely configured package
//!
//! The agent fetches a small configuration document from a remote store once,
//! and while the document is enabled it repeatedly checks whether the target
//! package is installed. When it is not, the agent downloads the package
//! artifact and hands it to the platform installer, then checks again after a
//! fixed delay. Once the package is installed the agent launches it, releases
//! its lifecycle grant and stops.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the port traits
//! - **Service Layer** (`services`): config client, downloader, install
//!   checker and install dispatcher
//! - **Application Layer** (`application`): agent context and the
//!   convergence loop
//! - **Infrastructure Layer** (`infrastructure`): host adapters, configuration
//!   and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use install_agent::application::{AgentContext, ConvergenceLoop, LoopSettings};
//! use install_agent::infrastructure::{config::ConfigLoader, setup};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let ctx = Arc::new(AgentContext::detached(&config));
//!     let agent = ConvergenceLoop::new(ctx, setup::build_collaborators(&config)?, LoopSettings::from(&config));
//!     let report = agent.run().await;
//!     println!("{}", report.outcome.as_str());
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{AgentContext, Collaborators, ConvergenceLoop, LoopSettings};
pub use domain::errors::{AgentError, AgentResult};
pub use domain::models::{Config, LoopOutcome, LoopReport, LoopState, RemoteConfig};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConfigClient, Downloader, InstallChecker, InstallDispatcher};
