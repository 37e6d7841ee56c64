//! Harness Configuration
//!
//! Everything the harness needs to know about its environment, captured once
//! at construction instead of being read from the process environment later.

use super::cluster::{ConfigBuilder, DEFAULT_HOST, DEFAULT_NODE_LOG_LEVEL, DEFAULT_NODE_PREFIX};
use crate::error::{HarnessError, HarnessResult};
use shared::ClusterSpec;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the server executable
pub const EXECUTABLE_NAME_VAR: &str = "ARAKOON_EXECUTABLE_NAME";
/// Server executable name used when the variable is unset
pub const DEFAULT_EXECUTABLE_NAME: &str = "arakoon.native";
/// Client test binary expected next to the harness
pub const DEFAULT_CLIENT_TEST: &str = "test-arakoon-client";
pub const DEFAULT_CLUSTER_ID: &str = "crakoon";
pub const DEFAULT_BASE_PORT: u16 = 5000;
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);

/// How the harness waits for a freshly spawned cluster
#[derive(Debug, Clone, PartialEq)]
pub enum SettleStrategy {
    /// Sleep for a fixed duration
    Fixed(Duration),
    /// Poll every node's client port until it accepts connections
    Probe { timeout: Duration, interval: Duration },
}

impl Default for SettleStrategy {
    fn default() -> Self {
        SettleStrategy::Fixed(DEFAULT_SETTLE)
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub working_dir: PathBuf,
    /// Parent of the per-run workspace; the system temp directory when unset
    pub workspace_root: Option<PathBuf>,
    pub executable_name: String,
    pub client_tests: Vec<PathBuf>,
    pub node_count: usize,
    pub base_port: u16,
    pub cluster_id: String,
    pub node_prefix: String,
    pub host: String,
    pub node_log_level: String,
    pub settle: SettleStrategy,
}

impl HarnessConfig {
    /// Create a new builder
    pub fn builder() -> crate::config::builder::HarnessConfigBuilder {
        crate::config::builder::HarnessConfigBuilder::new()
    }

    /// Defaults rooted at `working_dir`
    pub fn rooted_at(working_dir: PathBuf) -> Self {
        let client_test = working_dir.join(DEFAULT_CLIENT_TEST);
        Self {
            working_dir,
            workspace_root: None,
            executable_name: DEFAULT_EXECUTABLE_NAME.to_string(),
            client_tests: vec![client_test],
            node_count: 1,
            base_port: DEFAULT_BASE_PORT,
            cluster_id: DEFAULT_CLUSTER_ID.to_string(),
            node_prefix: DEFAULT_NODE_PREFIX.to_string(),
            host: DEFAULT_HOST.to_string(),
            node_log_level: DEFAULT_NODE_LOG_LEVEL.to_string(),
            settle: SettleStrategy::default(),
        }
    }

    /// Read the current directory and the executable variable from the process environment
    pub fn from_env() -> HarnessResult<Self> {
        let working_dir = std::env::current_dir()?;
        Ok(Self::from_env_with(working_dir, |key| std::env::var(key).ok()))
    }

    /// Same as [`HarnessConfig::from_env`] with an explicit variable lookup
    pub fn from_env_with<F>(working_dir: PathBuf, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::rooted_at(working_dir);
        if let Some(name) = lookup(EXECUTABLE_NAME_VAR).filter(|name| !name.is_empty()) {
            config.executable_name = name;
        }
        config
    }

    /// Absolute path of the server executable
    pub fn server_executable(&self) -> PathBuf {
        resolve(&self.working_dir, Path::new(&self.executable_name))
    }

    /// Absolute paths of the client test binaries, in run order
    pub fn client_test_paths(&self) -> Vec<PathBuf> {
        self.client_tests
            .iter()
            .map(|path| resolve(&self.working_dir, path))
            .collect()
    }

    /// Cluster builder carrying this config's naming, host and log level
    pub fn config_builder(&self) -> ConfigBuilder {
        ConfigBuilder::new()
            .node_prefix(self.node_prefix.clone())
            .host(self.host.clone())
            .log_level(self.node_log_level.clone())
    }

    /// Build the cluster described by this config
    pub fn cluster_spec(&self) -> HarnessResult<(ClusterSpec, String)> {
        Ok(self
            .config_builder()
            .build(self.node_count, self.base_port, &self.cluster_id)?)
    }

    /// Check the fields a builder cannot enforce on its own
    pub fn validate(&self) -> HarnessResult<()> {
        if self.executable_name.is_empty() {
            return Err(HarnessError::ConfigurationError {
                field: "executable_name must not be empty".to_string(),
            });
        }
        if self.client_tests.is_empty() {
            return Err(HarnessError::ConfigurationError {
                field: "at least one client test is required".to_string(),
            });
        }
        if let SettleStrategy::Probe { timeout, interval } = &self.settle {
            if interval.is_zero() || interval > timeout {
                return Err(HarnessError::ConfigurationError {
                    field: format!("probe interval {interval:?} must be non-zero and within {timeout:?}"),
                });
            }
        }
        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::rooted_at(PathBuf::from("/opt/build"));

        assert_eq!(config.server_executable(), PathBuf::from("/opt/build/arakoon.native"));
        assert_eq!(
            config.client_test_paths(),
            vec![PathBuf::from("/opt/build/test-arakoon-client")]
        );
        assert_eq!(config.node_count, 1);
        assert_eq!(config.base_port, 5000);
        assert_eq!(config.cluster_id, "crakoon");
        assert_eq!(config.settle, SettleStrategy::Fixed(Duration::from_secs(5)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_executable_name_from_environment() {
        let config = HarnessConfig::from_env_with(PathBuf::from("/opt/build"), |key| {
            (key == EXECUTABLE_NAME_VAR).then(|| "arakoon.byte".to_string())
        });
        assert_eq!(config.server_executable(), PathBuf::from("/opt/build/arakoon.byte"));
    }

    #[test]
    fn test_empty_environment_value_keeps_default() {
        let config = HarnessConfig::from_env_with(PathBuf::from("/opt/build"), |_| Some(String::new()));
        assert_eq!(config.executable_name, DEFAULT_EXECUTABLE_NAME);
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let mut config = HarnessConfig::rooted_at(PathBuf::from("/opt/build"));
        config.executable_name = "/usr/local/bin/arakoon".to_string();
        config.client_tests = vec![PathBuf::from("/srv/tests/nursery"), PathBuf::from("client")];

        assert_eq!(config.server_executable(), PathBuf::from("/usr/local/bin/arakoon"));
        assert_eq!(
            config.client_test_paths(),
            vec![PathBuf::from("/srv/tests/nursery"), PathBuf::from("/opt/build/client")]
        );
    }

    #[test]
    fn test_cluster_spec_uses_config_fields() {
        let mut config = HarnessConfig::rooted_at(PathBuf::from("/opt/build"));
        config.node_count = 2;
        config.base_port = 7000;
        config.node_prefix = "ring".to_string();
        config.node_log_level = "warning".to_string();

        let (spec, text) = config.cluster_spec().unwrap();
        assert_eq!(spec.names(), vec!["ring_0", "ring_1"]);
        assert_eq!(spec.nodes[1].client_port, 7002);
        assert!(text.contains("log_level = warning"));
    }

    #[test]
    fn test_validate_rejects_bad_probe() {
        let mut config = HarnessConfig::rooted_at(PathBuf::from("/opt/build"));
        config.settle = SettleStrategy::Probe {
            timeout: Duration::from_secs(1),
            interval: Duration::ZERO,
        };
        assert!(matches!(
            config.validate(),
            Err(HarnessError::ConfigurationError { .. })
        ));

        config.client_tests.clear();
        config.settle = SettleStrategy::default();
        assert!(config.validate().is_err());
    }
}
