//! Cluster Test Harness
//!
//! Provisions a throwaway multi-node cluster of the storage server, runs the
//! client test binaries against it and tears everything down again, whatever
//! way the run ends.
//!
//! ## Main Interface
//!
//! [`run`] drives a whole session from a [`HarnessConfig`]. Callers that need
//! the cluster for something else can use [`ClusterLifecycle::scope`] directly.
//!
//! ## Quick Start
//!
//! ```no_run
//! use harness::*;
//! use std::time::Duration;
//!
//! # async fn example() -> HarnessResult<()> {
//! let config = HarnessConfig::builder()
//!     .working_dir("/opt/arakoon/build")
//!     .nodes(3)
//!     .settle_for(Duration::from_secs(5))
//!     .build();
//!
//! let report = harness::run(config).await?;
//! std::process::exit(report.exit_code());
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod runtime;
pub mod testing;

// Main interfaces - re-exported at crate root for convenience
pub use config::{ConfigBuilder, HarnessConfig, HarnessConfigBuilder, SettleStrategy, render_config};
pub use error::{HarnessError, HarnessResult};
pub use runtime::{ClusterHandle, ClusterLifecycle, NodeLauncher, ServerLauncher};
pub use testing::{TestInvoker, TestOutcome, TestReport, run_client_tests};

use tracing::{info, warn};

/// Run every configured client test against a fresh cluster
///
/// The cluster is released before this returns, including when a test fails
/// to launch or the run is interrupted with Ctrl+C.
pub async fn run(config: HarnessConfig) -> HarnessResult<TestReport> {
    config.validate()?;
    let (spec, _) = config.cluster_spec()?;
    let client_tests = config.client_test_paths();

    info!(
        "🧪 Testing cluster {} ({} nodes) with {} client test(s)",
        spec.cluster_id,
        spec.len(),
        client_tests.len()
    );

    let session = ClusterLifecycle::new(&config).scope(&spec, |cluster| async move {
        run_client_tests(&client_tests, &cluster).await
    });

    // Dropping the session mid-way hands teardown to the lifecycle's Drop.
    // Biased so the Ctrl+C handler is installed before any node is spawned.
    tokio::select! {
        biased;
        _ = interrupted() => {
            warn!("🛑 Interrupted, tearing the cluster down");
            Err(HarnessError::Interrupted)
        }
        report = session => report,
    }
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️ Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
