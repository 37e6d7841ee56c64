//! Cluster Lifecycle Management
//!
//! Owns everything a test run allocates: the workspace directory and the node
//! processes. `acquire` builds the cluster, `release` tears it down, and
//! `scope` pairs the two around a caller's body so teardown runs on every
//! exit path. `Drop` covers the paths `scope` cannot see (panic, cancellation).

use shared::{ClusterSpec, NodeSpec, SharedError, node_error, node_info};
use std::future::Future;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

use super::cleanup::{NodeProcess, discard_workspace, force_kill, remove_workspace, terminate_node};
use super::launcher::{NodeLauncher, ServerLauncher};
use super::settle::settle;
use crate::config::{HarnessConfig, SettleStrategy, render_config};
use crate::error::{HarnessError, HarnessResult};

/// Prefix of every workspace directory
pub const WORKSPACE_PREFIX: &str = "crakoon_test";
/// Name of the config file inside the workspace
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// What a caller gets to see of a live cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterHandle {
    pub cluster_id: String,
    /// Nodes in cluster order, homes resolved inside the workspace
    pub nodes: Vec<NodeSpec>,
    pub workspace: PathBuf,
    pub config_path: PathBuf,
}

pub struct ClusterLifecycle {
    launcher: Box<dyn NodeLauncher>,
    settle: SettleStrategy,
    workspace_root: Option<PathBuf>,
    workspace: Option<TempDir>,
    processes: Vec<NodeProcess>,
}

impl ClusterLifecycle {
    /// Lifecycle launching the server executable named by `config`
    pub fn new(config: &HarnessConfig) -> Self {
        let lifecycle =
            Self::with_launcher(ServerLauncher::new(config.server_executable()), config.settle.clone());
        match &config.workspace_root {
            Some(root) => lifecycle.in_workspace_root(root.clone()),
            None => lifecycle,
        }
    }

    pub fn with_launcher<L>(launcher: L, settle: SettleStrategy) -> Self
    where
        L: NodeLauncher + 'static,
    {
        Self {
            launcher: Box::new(launcher),
            settle,
            workspace_root: None,
            workspace: None,
            processes: Vec::new(),
        }
    }

    /// Create workspaces under `root` instead of the system temp directory
    pub fn in_workspace_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Workspace of the live cluster, if any
    pub fn workspace(&self) -> Option<&Path> {
        self.workspace.as_ref().map(TempDir::path)
    }

    /// Pids of the tracked node processes that have not been reaped
    pub fn pids(&self) -> Vec<u32> {
        self.processes.iter().filter_map(NodeProcess::pid).collect()
    }

    /// Build the workspace, spawn every node and wait for the cluster to settle
    ///
    /// On failure after the workspace exists, everything allocated so far is
    /// released before the error is returned.
    pub async fn acquire(&mut self, spec: &ClusterSpec) -> HarnessResult<ClusterHandle> {
        if let Some(workspace) = self.workspace() {
            return Err(HarnessError::AlreadyAcquired {
                workspace: workspace.to_path_buf(),
            });
        }

        // Nothing is allocated before these checks pass
        check_layout(spec)?;
        self.launcher.verify()?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let workspace = match &self.workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| HarnessError::WorkspaceCreationFailed { source })?;
        info!("🚀 Running inside {}", workspace.path().display());
        let root = workspace.path().to_path_buf();
        self.workspace = Some(workspace);

        match self.start(spec, &root).await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                error!("❌ Cluster setup failed: {}", e);
                if let Err(release_err) = self.release().await {
                    error!("❌ Release after failed setup also failed: {}", release_err);
                }
                Err(e)
            }
        }
    }

    async fn start(&mut self, spec: &ClusterSpec, root: &Path) -> HarnessResult<ClusterHandle> {
        let rooted = spec.rooted_at(root);

        for node in &rooted.nodes {
            std::fs::create_dir(&node.home_dir).map_err(|source| HarnessError::FileSystemError {
                operation: "create home directory".to_string(),
                path: node.home_dir.clone(),
                source,
            })?;
        }

        let config_path = root.join(CONFIG_FILE_NAME);
        debug!("Writing config to {}", config_path.display());
        std::fs::write(&config_path, render_config(&rooted)).map_err(|source| {
            HarnessError::FileSystemError {
                operation: "write config".to_string(),
                path: config_path.clone(),
                source,
            }
        })?;

        for node in &rooted.nodes {
            node_info!(node.name, "🚀 Launching node {}", node.name);
            let child = self.launcher.launch(node, &config_path, root).await?;
            self.processes.push(NodeProcess::new(node.name.clone(), child));
        }

        settle(&self.settle, &rooted.nodes).await?;
        info!("✅ Cluster {} up with {} nodes", rooted.cluster_id, rooted.nodes.len());

        Ok(ClusterHandle {
            cluster_id: rooted.cluster_id,
            nodes: rooted.nodes,
            workspace: root.to_path_buf(),
            config_path,
        })
    }

    /// Terminate every tracked process, then remove the workspace
    ///
    /// Process failures are logged and skipped; a workspace that cannot be
    /// removed is an error. Calling this without a live cluster is a no-op.
    pub async fn release(&mut self) -> HarnessResult<()> {
        info!("🛑 Releasing cluster ({} processes)", self.processes.len());

        for mut process in self.processes.drain(..) {
            if !terminate_node(&mut process).await {
                node_error!(process.node, "⚠️ Process may have outlived teardown");
            }
        }

        match self.workspace.take() {
            Some(workspace) => remove_workspace(workspace),
            None => Ok(()),
        }
    }

    /// Acquire the cluster, run `body` against it and release it on every path
    ///
    /// The body's error takes precedence over a release error; the latter is
    /// logged. A body that panics or is cancelled is covered by `Drop`.
    pub async fn scope<F, Fut, T>(mut self, spec: &ClusterSpec, body: F) -> HarnessResult<T>
    where
        F: FnOnce(ClusterHandle) -> Fut,
        Fut: Future<Output = HarnessResult<T>>,
    {
        let handle = self.acquire(spec).await?;
        let outcome = body(handle).await;
        let released = self.release().await;

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release_err)) => Err(release_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_err)) => {
                error!("❌ Release failed after body error: {}", release_err);
                Err(e)
            }
        }
    }
}

/// Reject clusters the workspace cannot fully contain
fn check_layout(spec: &ClusterSpec) -> HarnessResult<()> {
    if spec.is_empty() {
        return Err(SharedError::InvalidNodeCount { count: 0 }.into());
    }
    match spec.nodes.iter().find(|node| !node.has_local_home()) {
        Some(node) => Err(HarnessError::ConfigurationError {
            field: format!(
                "home of {} must be a plain directory name, got {}",
                node.name,
                node.home_dir.display()
            ),
        }),
        None => Ok(()),
    }
}

impl Drop for ClusterLifecycle {
    fn drop(&mut self) {
        if self.processes.is_empty() && self.workspace.is_none() {
            return;
        }

        // Emergency cleanup - release() never ran
        warn!("🚨 Emergency cleanup: cluster dropped without release");
        for process in &mut self.processes {
            force_kill(process);
        }
        self.processes.clear();

        if let Some(workspace) = self.workspace.take() {
            discard_workspace(workspace);
        }
    }
}
