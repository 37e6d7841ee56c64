//! Configuration Management
//!
//! Harness settings and the pure cluster layout builder.

pub mod builder;
pub mod cluster;
pub mod harness;

// Re-export main types
pub use builder::HarnessConfigBuilder;
pub use cluster::{ConfigBuilder, render_config};
pub use harness::{HarnessConfig, SettleStrategy};
