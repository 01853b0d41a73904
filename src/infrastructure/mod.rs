//! Infrastructure layer module
//!
//! Host adapters satisfying the domain ports:
//! - Remote configuration store over HTTP
//! - Filesystem artifact store and background HTTP downloads
//! - Command-based package registry and action launcher
//! - Shared-directory content provider and pid-file lifecycle grant
//!
//! plus configuration loading, logging and host wiring.

pub mod config;
pub mod download;
pub mod logging;
pub mod platform;
pub mod remote;
pub mod setup;
