//! Error types for host and configuration operations

use crate::host::ResourceId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from host collaborators
#[derive(Debug, Error)]
pub enum HostError {
    #[error("resource {0} is no longer valid")]
    StaleResource(ResourceId),

    #[error("failed to initialize file watcher")]
    InitWatcher(#[source] notify::Error),

    #[error("failed to watch path {path}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),
}
