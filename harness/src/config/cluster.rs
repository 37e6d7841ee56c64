//! Cluster Configuration Builder
//!
//! Derives the node layout of a test cluster and renders the ini document the
//! server binary reads. Nothing here touches the filesystem.

use shared::{ClusterSpec, NodeSpec, SharedError, SharedResult};
use std::path::PathBuf;

pub const DEFAULT_NODE_PREFIX: &str = "crakoon";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_NODE_LOG_LEVEL: &str = "info";

/// Builds a [`ClusterSpec`] and its config text from a node count and base port
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    node_prefix: String,
    host: String,
    log_level: String,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            node_prefix: DEFAULT_NODE_PREFIX.to_string(),
            host: DEFAULT_HOST.to_string(),
            log_level: DEFAULT_NODE_LOG_LEVEL.to_string(),
        }
    }

    /// Set the prefix node names are derived from (`<prefix>_<index>`)
    pub fn node_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.node_prefix = prefix.into();
        self
    }

    /// Set the address every node binds to
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    /// Set the log level written into every node section
    pub fn log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the cluster layout and its config text
    ///
    /// Node `i` gets `client_port = base_port + 2i` and
    /// `messaging_port = base_port + 2i + 1`. Homes are relative to the
    /// workspace, which does not exist yet.
    pub fn build(
        &self,
        node_count: usize,
        base_port: u16,
        cluster_id: &str,
    ) -> SharedResult<(ClusterSpec, String)> {
        if node_count == 0 {
            return Err(SharedError::InvalidNodeCount { count: node_count });
        }
        if base_port == 0 {
            return Err(SharedError::InvalidConfig {
                field: "base_port".to_string(),
                value: base_port.to_string(),
            });
        }
        if cluster_id.is_empty() {
            return Err(SharedError::InvalidConfig {
                field: "cluster_id".to_string(),
                value: String::new(),
            });
        }

        let last_port = (base_port as usize) + 2 * node_count - 1;
        if last_port > u16::MAX as usize {
            return Err(SharedError::PortRangeExceeded { base_port, node_count });
        }

        let nodes = (0..node_count)
            .map(|index| {
                let name = format!("{}_{}", self.node_prefix, index);
                let client_port = base_port + (2 * index) as u16;
                NodeSpec {
                    home_dir: PathBuf::from(&name),
                    name,
                    host: self.host.clone(),
                    client_port,
                    messaging_port: client_port + 1,
                }
            })
            .collect();

        let spec = ClusterSpec {
            cluster_id: cluster_id.to_string(),
            nodes,
            log_level: self.log_level.clone(),
        };
        let text = render_config(&spec);

        Ok((spec, text))
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the ini document for a cluster
pub fn render_config(spec: &ClusterSpec) -> String {
    let mut text = format!(
        "[global]\ncluster = {}\ncluster_id = {}\n",
        spec.names().join(", "),
        spec.cluster_id
    );

    for node in &spec.nodes {
        text.push_str(&format!(
            "\n[{}]\nip = {}\nclient_port = {}\nmessaging_port = {}\nhome = {}\nlog_level = {}\n",
            node.name,
            node.host,
            node.client_port,
            node.messaging_port,
            node.home_dir.display(),
            spec.log_level
        ));
    }

    text
}
