//! Harness Configuration Builder
//!
//! Provides a flexible builder pattern for constructing harness configurations

use super::{HarnessConfig, SettleStrategy};
use std::path::PathBuf;
use std::time::Duration;

pub struct HarnessConfigBuilder {
    config: HarnessConfig,
    client_tests: Vec<PathBuf>,
}

impl HarnessConfigBuilder {
    /// Start from the defaults rooted at the current directory (or `.` if it cannot be read)
    pub fn new() -> Self {
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_config(HarnessConfig::rooted_at(working_dir))
    }

    /// Start from an existing configuration, typically [`HarnessConfig::from_env`]
    pub fn from_config(config: HarnessConfig) -> Self {
        Self {
            config,
            client_tests: Vec::new(),
        }
    }

    /// Set the directory executables are resolved against
    ///
    /// Client tests left at their default follow the new directory.
    pub fn working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        let dir = dir.into();
        let defaults = HarnessConfig::rooted_at(self.config.working_dir.clone()).client_tests;
        if self.config.client_tests == defaults {
            self.config.client_tests = HarnessConfig::rooted_at(dir.clone()).client_tests;
        }
        self.config.working_dir = dir;
        self
    }

    /// Create run workspaces under `root`
    pub fn workspace_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.config.workspace_root = Some(root.into());
        self
    }

    /// Set the server executable name (relative to the working dir) or path
    pub fn executable_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.executable_name = name.into();
        self
    }

    /// Add a client test binary; the first call replaces the default
    pub fn client_test<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.client_tests.push(path.into());
        self
    }

    /// Set number of nodes
    pub fn nodes(mut self, count: usize) -> Self {
        self.config.node_count = count;
        self
    }

    /// Set the first port; each node takes two consecutive ports
    pub fn base_port(mut self, port: u16) -> Self {
        self.config.base_port = port;
        self
    }

    pub fn cluster_id<S: Into<String>>(mut self, id: S) -> Self {
        self.config.cluster_id = id.into();
        self
    }

    pub fn node_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.node_prefix = prefix.into();
        self
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set node log level (debug, info, notice, warning, error, fatal)
    pub fn node_log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.config.node_log_level = level.into();
        self
    }

    /// Wait a fixed duration after spawning
    pub fn settle_for(mut self, duration: Duration) -> Self {
        self.config.settle = SettleStrategy::Fixed(duration);
        self
    }

    /// Poll client ports instead of sleeping
    pub fn probe_readiness(mut self, timeout: Duration, interval: Duration) -> Self {
        self.config.settle = SettleStrategy::Probe { timeout, interval };
        self
    }

    /// Build the configuration
    pub fn build(mut self) -> HarnessConfig {
        if !self.client_tests.is_empty() {
            self.config.client_tests = self.client_tests;
        }
        self.config
    }
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
