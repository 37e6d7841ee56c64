//! Shared types for the cluster conformance harness
//!
//! Holds the cluster description consumed by every part of the harness,
//! the errors raised while building it, and the logging setup.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
