//! Host platform adapters
//!
//! Package queries and platform actions are delegated to configurable host
//! commands; file sharing and the single-instance lock work on the local
//! filesystem.

pub mod command;
pub mod content;
pub mod grant;
pub mod launcher;
pub mod registry;

pub use command::{CommandTemplate, TemplateVars};
pub use content::SharedDirContentProvider;
pub use grant::PidFileGrant;
pub use launcher::CommandActionLauncher;
pub use registry::CommandPackageRegistry;
