//! Cluster test runner
//!
//! Starts a cluster of the storage server in a temporary workspace, runs the
//! client test binaries against it and exits with the first failing test's
//! status.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use harness::{HarnessConfig, HarnessConfigBuilder, HarnessError};

/// Exit code for an interrupted run, as a shell reports SIGINT
const INTERRUPTED_EXIT_CODE: u8 = 130;

#[derive(Parser)]
#[command(name = "harness")]
#[command(about = "Runs client tests against a throwaway Arakoon cluster")]
struct Args {
    /// Number of nodes in the cluster
    #[arg(long, default_value = "1")]
    nodes: usize,

    /// First port; node i uses base+2i (client) and base+2i+1 (messaging)
    #[arg(long, default_value = "5000")]
    base_port: u16,

    #[arg(long, default_value = "crakoon")]
    cluster_id: String,

    /// Node names are <prefix>_<index>
    #[arg(long, default_value = "crakoon")]
    node_prefix: String,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Seconds to wait after spawning the nodes
    #[arg(long, default_value = "5")]
    settle_secs: u64,

    /// Poll client ports for up to this many seconds instead of a fixed wait
    #[arg(long)]
    probe_timeout_secs: Option<u64>,

    /// Client test binary; repeat to run several in order
    #[arg(long)]
    client_test: Vec<PathBuf>,

    /// Directory the server executable and client tests are resolved against
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Directory to create the run workspace in (system temp dir by default)
    #[arg(long)]
    workspace_root: Option<PathBuf>,

    /// Log level written into every node's config
    #[arg(long, default_value = "info")]
    node_log_level: String,

    /// Harness log level
    #[arg(long)]
    log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn into_config(self, base: HarnessConfig) -> HarnessConfig {
        let mut builder = HarnessConfigBuilder::from_config(base)
            .nodes(self.nodes)
            .base_port(self.base_port)
            .cluster_id(self.cluster_id)
            .node_prefix(self.node_prefix)
            .host(self.host)
            .node_log_level(self.node_log_level);

        if let Some(dir) = self.working_dir {
            builder = builder.working_dir(dir);
        }
        if let Some(root) = self.workspace_root {
            builder = builder.workspace_root(root);
        }
        for test in self.client_test {
            builder = builder.client_test(test);
        }

        builder = match self.probe_timeout_secs {
            Some(secs) => builder.probe_readiness(Duration::from_secs(secs), Duration::from_millis(250)),
            None => builder.settle_for(Duration::from_secs(self.settle_secs)),
        };

        builder.build()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let log_level = if args.verbose {
        Some("debug".to_string())
    } else {
        args.log_level.clone()
    };
    shared::logging::init_tracing(log_level.as_deref());

    let base = HarnessConfig::from_env().context("reading harness environment")?;
    let config = args.into_config(base);
    tracing::info!(
        "🧪 Server {} in {}",
        config.server_executable().display(),
        config.working_dir.display()
    );

    match harness::run(config).await {
        Ok(report) => {
            let code = report.exit_code();
            if report.passed() {
                tracing::info!("🏁 All client tests passed");
            } else {
                tracing::error!("❌ Client tests failed with exit code {}", code);
            }
            Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
        }
        Err(HarnessError::Interrupted) => {
            tracing::warn!("🛑 Run interrupted");
            Ok(ExitCode::from(INTERRUPTED_EXIT_CODE))
        }
        Err(e) => Err(e).context("cluster test run failed"),
    }
}
