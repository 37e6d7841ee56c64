//! Node process launching
//!
//! The launcher is the seam between the lifecycle and the real server binary,
//! so lifecycle ordering can be exercised without one.

use async_trait::async_trait;
use shared::{NodeSpec, node_debug};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

use crate::error::{HarnessError, HarnessResult};

/// Starts one server process per node
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeLauncher: Send + Sync {
    /// Check the server executable is usable; must not allocate anything
    fn verify(&self) -> HarnessResult<()>;

    /// Spawn the process for `node`, reading `config_path`, running inside `workspace`
    async fn launch(&self, node: &NodeSpec, config_path: &Path, workspace: &Path) -> HarnessResult<Child>;
}

/// Launches the real server executable
#[derive(Debug, Clone)]
pub struct ServerLauncher {
    executable: PathBuf,
}

impl ServerLauncher {
    pub fn new<P: Into<PathBuf>>(executable: P) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Command line for one node, without spawning it
    pub fn command(&self, node: &NodeSpec, config_path: &Path, workspace: &Path) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("-config")
            .arg(config_path)
            .arg("--node")
            .arg(&node.name)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Own process group: the node is signalled apart from the harness and
        // does not receive the terminal's Ctrl+C
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}

#[async_trait]
impl NodeLauncher for ServerLauncher {
    fn verify(&self) -> HarnessResult<()> {
        check_executable(&self.executable)
    }

    async fn launch(&self, node: &NodeSpec, config_path: &Path, workspace: &Path) -> HarnessResult<Child> {
        node_debug!(
            node.name,
            "Launching {} -config {} --node {}",
            self.executable.display(),
            config_path.display(),
            node.name
        );

        self.command(node, config_path, workspace)
            .spawn()
            .map_err(|source| HarnessError::NodeSpawnFailed {
                node: node.name.clone(),
                source,
            })
    }
}

/// Fail unless `path` is a regular file the current user may execute
pub fn check_executable(path: &Path) -> HarnessResult<()> {
    if !path.is_file() {
        return Err(HarnessError::ExecutableNotFound {
            path: path.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        use nix::unistd::{AccessFlags, access};

        if access(path, AccessFlags::X_OK).is_err() {
            return Err(HarnessError::ExecutableNotExecutable {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use tempfile::TempDir;

    fn node() -> NodeSpec {
        NodeSpec {
            name: "crakoon_0".to_string(),
            host: "127.0.0.1".to_string(),
            client_port: 5000,
            messaging_port: 5001,
            home_dir: PathBuf::from("crakoon_0"),
        }
    }

    #[test]
    fn test_missing_executable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arakoon.native");

        let result = check_executable(&path);
        assert!(matches!(result, Err(HarnessError::ExecutableNotFound { path: p }) if p == path));
    }

    #[test]
    fn test_directory_is_not_an_executable() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            check_executable(dir.path()),
            Err(HarnessError::ExecutableNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_bit_required() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arakoon.native");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        // No execute bit at all: rejected even when running as root
        assert!(matches!(
            check_executable(&path),
            Err(HarnessError::ExecutableNotExecutable { .. })
        ));

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(check_executable(&path).is_ok());
    }

    #[test]
    fn test_command_arguments() {
        let launcher = ServerLauncher::new("/opt/build/arakoon.native");
        let cmd = launcher.command(&node(), Path::new("/tmp/ws/config.ini"), Path::new("/tmp/ws"));
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), OsStr::new("/opt/build/arakoon.native"));
        let args: Vec<&OsStr> = std_cmd.get_args().collect();
        assert_eq!(
            args,
            vec![
                OsStr::new("-config"),
                OsStr::new("/tmp/ws/config.ini"),
                OsStr::new("--node"),
                OsStr::new("crakoon_0"),
            ]
        );
        assert_eq!(std_cmd.get_current_dir(), Some(Path::new("/tmp/ws")));
    }
}
