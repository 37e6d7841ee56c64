//! Shared error types for cluster description and configuration

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid node count: {count} (must be >= 1)")]
    InvalidNodeCount { count: usize },

    #[error("Port range exceeded: base port {base_port} cannot fit {node_count} nodes")]
    PortRangeExceeded { base_port: u16, node_count: usize },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
