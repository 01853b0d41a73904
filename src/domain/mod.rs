//! Domain layer for the install agent
//!
//! This module contains the desired-state models, the errors and the port
//! traits the host platform adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{AgentError, AgentResult, DownloadError, FetchError, LaunchError, RegistryError};
