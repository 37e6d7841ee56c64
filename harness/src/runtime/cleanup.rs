//! Process and Workspace Cleanup Utilities
//!
//! Termination of node processes and removal of the run workspace. Process
//! failures here are soft: they are logged and the caller moves on to the
//! next process. Workspace removal is hard and reported to the caller.

use shared::{node_debug, node_info, node_warn};
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Child;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};

/// How long to wait for a killed process to be reaped
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// A spawned node and its process
pub struct NodeProcess {
    pub node: String,
    pub child: Child,
}

impl NodeProcess {
    pub fn new(node: String, child: Child) -> Self {
        Self { node, child }
    }

    /// OS process id, `None` once the process has been reaped
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

/// Kill a node's process group and reap the process
///
/// Returns whether the process is known to be gone. Never fails: a node that
/// already exited is only worth a log line.
pub async fn terminate_node(process: &mut NodeProcess) -> bool {
    let Some(pid) = process.pid() else {
        node_debug!(process.node, "Process already reaped");
        return true;
    };

    node_info!(process.node, "🔪 Killing process {}", pid);
    signal_group(&process.node, pid);

    // Covers platforms without process groups and a pid whose group signal failed
    if let Err(e) = process.child.start_kill() {
        node_debug!(process.node, "Direct kill of {} failed: {}", pid, e);
    }

    match timeout(REAP_TIMEOUT, process.child.wait()).await {
        Ok(Ok(status)) => {
            node_debug!(process.node, "Process {} exited with {}", pid, status);
            true
        }
        Ok(Err(e)) => {
            node_warn!(process.node, "⚠️ Failed to reap process {}: {}", pid, e);
            false
        }
        Err(_) => {
            node_warn!(process.node, "⚠️ Process {} not reaped within {:?}", pid, REAP_TIMEOUT);
            false
        }
    }
}

/// Synchronous best-effort kill, for use where awaiting is impossible
pub fn force_kill(process: &mut NodeProcess) {
    if let Some(pid) = process.pid() {
        signal_group(&process.node, pid);
        if let Err(e) = process.child.start_kill() {
            node_debug!(process.node, "Direct kill of {} failed: {}", pid, e);
        }
    }
}

#[cfg(unix)]
fn signal_group(node: &str, pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    // Nodes are spawned as leaders of their own group, so the group id is the pid
    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => {
            node_debug!(node, "📤 Sent SIGKILL to process group {}", pid);
        }
        Err(Errno::ESRCH) => {
            node_debug!(node, "✅ Process group {} already gone", pid);
        }
        Err(e) => {
            node_warn!(node, "⚠️ Failed to signal process group {}: {}", pid, e);
        }
    }
}

#[cfg(not(unix))]
fn signal_group(_node: &str, _pid: u32) {}

/// Remove the workspace tree, reporting any failure
pub fn remove_workspace(workspace: TempDir) -> HarnessResult<()> {
    let path = workspace.path().to_path_buf();
    info!("🧹 Removing tree {}", path.display());

    workspace
        .close()
        .map_err(|source| HarnessError::WorkspaceRemovalFailed { path, source })
}

/// Remove the workspace tree from a context that cannot report errors
pub fn discard_workspace(workspace: TempDir) {
    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        warn!("⚠️ Failed to remove workspace {}: {}", path.display(), e);
    }
}
