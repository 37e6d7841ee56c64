//! Runtime tests
//!
//! Lifecycle ordering and teardown, driven through a mocked launcher that
//! spawns `sleep` stand-ins for the server.


// Common test utilities for runtime tests
#[cfg(test)]
pub mod common {
    use shared::{ClusterSpec, NodeSpec};
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tokio::process::{Child, Command};

    use crate::config::ConfigBuilder;
    use crate::error::{HarnessError, HarnessResult};

    /// Cluster of `count` nodes starting at port 5000
    pub fn cluster(count: usize) -> ClusterSpec {
        let (spec, _) = ConfigBuilder::new().build(count, 5000, "crakoon").unwrap();
        spec
    }

    /// Stand-in node process
    pub fn spawn_sleeper(workspace: &Path) -> HarnessResult<Child> {
        let mut cmd = Command::new("sleep");
        cmd.arg("30").current_dir(workspace).kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        Ok(cmd.spawn()?)
    }

    pub fn spawn_error(node: &NodeSpec) -> HarnessError {
        HarnessError::NodeSpawnFailed {
            node: node.name.clone(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "spawn refused"),
        }
    }

    /// Names and pids recorded by a mocked launcher
    #[derive(Clone, Default)]
    pub struct Launches {
        inner: Arc<Mutex<Vec<(String, u32)>>>,
    }

    impl Launches {
        pub fn record(&self, node: &str, child: &Child) {
            let pid = child.id().unwrap_or_default();
            self.inner.lock().unwrap().push((node.to_string(), pid));
        }

        pub fn names(&self) -> Vec<String> {
            self.inner.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
        }

        pub fn pids(&self) -> Vec<u32> {
            self.inner.lock().unwrap().iter().map(|(_, pid)| *pid).collect()
        }
    }

    /// Whether `pid` no longer names a live or zombie process
    #[cfg(unix)]
    pub fn process_gone(pid: u32) -> bool {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        kill(Pid::from_raw(pid as i32), None) == Err(Errno::ESRCH)
    }

    /// Wait up to `limit` for the runtime to reap `pid`
    #[cfg(unix)]
    pub async fn wait_gone(pid: u32, limit: std::time::Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        while !process_gone(pid) {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        true
    }

    /// Entries left in a workspace root
    pub fn entries(root: &Path) -> usize {
        std::fs::read_dir(root).map(|dir| dir.count()).unwrap_or(0)
    }
}
