//! Harness error types

use shared::SharedError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Server executable not found at {path}")]
    ExecutableNotFound { path: PathBuf },

    #[error("Server executable not executable at {path}")]
    ExecutableNotExecutable { path: PathBuf },

    #[error("Cluster already acquired in workspace {workspace}")]
    AlreadyAcquired { workspace: PathBuf },

    #[error("Failed to create workspace: {source}")]
    WorkspaceCreationFailed {
        #[source]
        source: std::io::Error,
    },

    #[error("File system operation failed: {operation} on {path}")]
    FileSystemError {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn node {node}: {source}")]
    NodeSpawnFailed {
        node: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cluster not ready after {timeout:?}: node {node} unreachable")]
    ClusterNotReady { node: String, timeout: Duration },

    #[error("Failed to remove workspace {path}: {source}")]
    WorkspaceRemovalFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch client test {path}: {source}")]
    ClientTestLaunchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Interrupted while the cluster was in use")]
    Interrupted,

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Cluster description error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
