//! Core cluster types shared between the harness library and its binary

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// One node of the cluster under test
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeSpec {
    /// Node name, unique within a cluster
    pub name: String,
    /// Address the node listens on
    pub host: String,
    /// Port served to clients
    pub client_port: u16,
    /// Port used for node-to-node messaging
    pub messaging_port: u16,
    /// Home directory of the node (workspace-relative until the cluster is rooted)
    pub home_dir: PathBuf,
}

impl NodeSpec {
    /// Client address in `host:port` form
    pub fn client_address(&self) -> String {
        format!("{}:{}", self.host, self.client_port)
    }

    /// Whether the home is a single plain directory name, so rooting it keeps it under the root
    pub fn has_local_home(&self) -> bool {
        let mut components = self.home_dir.components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    }
}

impl fmt::Display for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, client {}, messaging {})",
            self.name, self.host, self.client_port, self.messaging_port
        )
    }
}

/// Full description of a cluster: its id, its nodes in order and the node log level
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterSpec {
    pub cluster_id: String,
    pub nodes: Vec<NodeSpec>,
    pub log_level: String,
}

impl ClusterSpec {
    /// Number of nodes in the cluster
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Node names in cluster order
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.name.as_str()).collect()
    }

    /// Copy of this spec with every home directory joined onto `root`
    ///
    /// Only homes passing [`NodeSpec::has_local_home`] are guaranteed to end up
    /// inside `root`.
    pub fn rooted_at(&self, root: &Path) -> ClusterSpec {
        let nodes = self
            .nodes
            .iter()
            .map(|node| NodeSpec {
                home_dir: root.join(&node.home_dir),
                ..node.clone()
            })
            .collect();

        ClusterSpec {
            cluster_id: self.cluster_id.clone(),
            nodes,
            log_level: self.log_level.clone(),
        }
    }
}
