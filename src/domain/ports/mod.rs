//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the agent consumes from its host:
//! - RemoteStore: remote key-value configuration reads
//! - ArtifactStore: local artifact existence checks
//! - DownloadSubsystem: background downloads with per-request completion
//! - PackageRegistry: installed package queries and launch entries
//! - ContentProvider / ActionLauncher: install and launch actions
//! - LifecycleGrant: exclusive process lifecycle resources

pub mod artifact_store;
pub mod download_subsystem;
pub mod launcher;
pub mod lifecycle;
pub mod package_registry;
pub mod remote_store;

pub use artifact_store::ArtifactStore;
pub use download_subsystem::{DownloadHandle, DownloadSubsystem};
pub use launcher::{ActionLauncher, ContentProvider};
pub use lifecycle::{LifecycleGrant, NoopGrant};
pub use package_registry::{PackageInfo, PackageRegistry};
pub use remote_store::RemoteStore;
