//! Service layer - the collaborators composed by the convergence loop.

pub mod config_client;
pub mod downloader;
pub mod install_checker;
pub mod install_dispatcher;

pub use config_client::ConfigClient;
pub use downloader::{DownloadPolicy, Downloader};
pub use install_checker::InstallChecker;
pub use install_dispatcher::InstallDispatcher;
