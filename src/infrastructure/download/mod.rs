//! Artifact storage and download adapters

pub mod fs_store;
pub mod http_manager;

pub use fs_store::FsArtifactStore;
pub use http_manager::HttpDownloadManager;
