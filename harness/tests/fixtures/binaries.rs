//! Stand-in server and client binaries for integration testing
//!
//! Both are shell scripts written into a scratch directory. The server logs its
//! pid, working directory and arguments, then sleeps until killed. The client
//! logs its arguments and exits with a chosen code.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use harness::HarnessConfig;

pub const SERVER_NAME: &str = "fake-arakoon";
pub const CLIENT_NAME: &str = "fake-client";

/// Scratch directory holding the binaries, their logs and the run workspaces
pub struct TestBed {
    pub dir: TempDir,
    pub workspaces: PathBuf,
}

impl TestBed {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let workspaces = dir.path().join("workspaces");
        fs::create_dir(&workspaces).unwrap();
        Self { dir, workspaces }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn server_log(&self) -> PathBuf {
        self.path().join("server.log")
    }

    pub fn client_log(&self, name: &str) -> PathBuf {
        self.path().join(format!("{name}.log"))
    }

    /// Server that records `<pid>|<cwd>|<config present>|<args>` and sleeps
    pub fn install_server(&self) {
        let script = format!(
            "#!/bin/sh\n\
             if [ -f config.ini ]; then cfg=config; else cfg=missing; fi\n\
             echo \"$$|$(pwd)|$cfg|$*\" >> '{}'\n\
             exec sleep 60\n",
            self.server_log().display()
        );
        write_executable(&self.path().join(SERVER_NAME), &script);
    }

    /// Client named `name` that records its arguments and exits with `code`
    pub fn install_client(&self, name: &str, code: i32) {
        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\nexit {}\n",
            self.client_log(name).display(),
            code
        );
        write_executable(&self.path().join(name), &script);
    }

    /// Config pointing at the installed binaries with a short settle
    pub fn config(&self, nodes: usize) -> HarnessConfig {
        HarnessConfig::builder()
            .working_dir(self.path())
            .workspace_root(&self.workspaces)
            .executable_name(SERVER_NAME)
            .client_test(CLIENT_NAME)
            .nodes(nodes)
            .settle_for(Duration::from_millis(300))
            .build()
    }

    pub fn server_lines(&self) -> Vec<ServerLine> {
        read_lines(&self.server_log())
            .iter()
            .map(|line| ServerLine::parse(line))
            .collect()
    }

    pub fn client_lines(&self, name: &str) -> Vec<String> {
        read_lines(&self.client_log(name))
    }

    /// Workspaces left behind by finished runs
    pub fn leftover_workspaces(&self) -> usize {
        fs::read_dir(&self.workspaces).unwrap().count()
    }
}

/// One launch recorded by the fake server
#[derive(Debug, Clone)]
pub struct ServerLine {
    pub pid: i32,
    pub cwd: PathBuf,
    pub saw_config: bool,
    pub args: Vec<String>,
}

impl ServerLine {
    fn parse(line: &str) -> Self {
        let mut parts = line.splitn(4, '|');
        let pid = parts.next().unwrap().parse().unwrap();
        let cwd = PathBuf::from(parts.next().unwrap());
        let saw_config = parts.next().unwrap() == "config";
        let args = parts.next().unwrap().split(' ').map(str::to_string).collect();
        Self {
            pid,
            cwd,
            saw_config,
            args,
        }
    }
}

/// Whether no process (live or zombie) has this pid
pub fn process_gone(pid: i32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid), None) == Err(Errno::ESRCH)
}

/// Write `content` to `path` with mode 0755
pub fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
