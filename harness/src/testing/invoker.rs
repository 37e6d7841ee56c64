//! Client Test Invoker
//!
//! Runs an external client test binary against a live cluster. The binary
//! receives the cluster id followed by a `name host port` triple per node and
//! inherits the harness's stdio; its exit status is the test result.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{error, info};

use crate::error::{HarnessError, HarnessResult};
use crate::runtime::ClusterHandle;

/// Exit code reported when a client test was killed by a signal
const SIGNALLED_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone)]
pub struct TestInvoker {
    binary: PathBuf,
}

impl TestInvoker {
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self { binary: binary.into() }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments for `cluster`: its id, then name, host and client port of every node in order
    pub fn arguments(cluster: &ClusterHandle) -> Vec<String> {
        let mut args = Vec::with_capacity(1 + cluster.nodes.len() * 3);
        args.push(cluster.cluster_id.clone());
        for node in &cluster.nodes {
            args.push(node.name.clone());
            args.push(node.host.clone());
            args.push(node.client_port.to_string());
        }
        args
    }

    /// Full argument vector, binary path first
    pub fn argv(&self, cluster: &ClusterHandle) -> Vec<OsString> {
        std::iter::once(self.binary.clone().into_os_string())
            .chain(Self::arguments(cluster).into_iter().map(OsString::from))
            .collect()
    }

    pub fn command(&self, cluster: &ClusterHandle) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::arguments(cluster))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }

    /// Run the binary to completion
    pub async fn run(&self, cluster: &ClusterHandle) -> HarnessResult<TestOutcome> {
        info!("🧪 Running {} against {}", self.binary.display(), cluster.cluster_id);

        let status = self
            .command(cluster)
            .status()
            .await
            .map_err(|source| HarnessError::ClientTestLaunchFailed {
                path: self.binary.clone(),
                source,
            })?;

        let outcome = TestOutcome {
            binary: self.binary.clone(),
            status,
        };
        if outcome.passed() {
            info!("✅ {} passed", self.binary.display());
        } else {
            error!("❌ {} failed with {}", self.binary.display(), status);
        }
        Ok(outcome)
    }
}

/// Result of one client test run
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub binary: PathBuf,
    pub status: ExitStatus,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.status.success()
    }

    /// Exit code to propagate; a signalled test counts as a plain failure
    pub fn exit_code(&self) -> i32 {
        self.status.code().unwrap_or(SIGNALLED_EXIT_CODE)
    }
}

/// Outcomes of every client test that ran, in run order
#[derive(Debug, Clone, Default)]
pub struct TestReport {
    pub outcomes: Vec<TestOutcome>,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(TestOutcome::passed)
    }

    /// Code of the first failing test, 0 when all passed
    pub fn exit_code(&self) -> i32 {
        match self.outcomes.iter().find(|outcome| !outcome.passed()) {
            Some(failed) => failed.exit_code(),
            None if self.outcomes.is_empty() => SIGNALLED_EXIT_CODE,
            None => 0,
        }
    }
}

/// Run `binaries` in order against `cluster`, stopping at the first failure
pub async fn run_client_tests(binaries: &[PathBuf], cluster: &ClusterHandle) -> HarnessResult<TestReport> {
    let mut report = TestReport::default();
    for binary in binaries {
        let outcome = TestInvoker::new(binary.clone()).run(cluster).await?;
        let passed = outcome.passed();
        report.outcomes.push(outcome);
        if !passed {
            break;
        }
    }
    Ok(report)
}
