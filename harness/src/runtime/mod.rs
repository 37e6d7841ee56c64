//! Runtime Management
//!
//! This module handles the node processes and workspace of a test cluster.

pub mod cleanup;
pub mod launcher;
pub mod lifecycle;
pub mod settle;

#[cfg(test)]
mod tests;

// Re-export main types
pub use launcher::{NodeLauncher, ServerLauncher, check_executable};
pub use lifecycle::{CONFIG_FILE_NAME, ClusterHandle, ClusterLifecycle, WORKSPACE_PREFIX};
