//! Waiting for a spawned cluster to become usable

use shared::{NodeSpec, node_debug};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};
use tracing::info;

use crate::config::SettleStrategy;
use crate::error::{HarnessError, HarnessResult};

/// Block until the cluster is assumed (fixed) or observed (probe) to be usable
pub async fn settle(strategy: &SettleStrategy, nodes: &[NodeSpec]) -> HarnessResult<()> {
    match strategy {
        SettleStrategy::Fixed(duration) => {
            info!("⏳ Waiting {:?} for nodes to settle...", duration);
            sleep(*duration).await;
            Ok(())
        }
        SettleStrategy::Probe {
            timeout: limit,
            interval,
        } => {
            info!("⏳ Probing {} nodes for up to {:?}", nodes.len(), limit);
            let deadline = Instant::now() + *limit;
            for node in nodes {
                wait_for_node(node, deadline, *limit, *interval).await?;
            }
            Ok(())
        }
    }
}

async fn wait_for_node(
    node: &NodeSpec,
    deadline: Instant,
    limit: Duration,
    interval: Duration,
) -> HarnessResult<()> {
    let address = node.client_address();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(HarnessError::ClusterNotReady {
                node: node.name.clone(),
                timeout: limit,
            });
        }

        match timeout(remaining.min(interval), TcpStream::connect(&address)).await {
            Ok(Ok(_)) => {
                node_debug!(node.name, "✅ Accepting connections on {}", address);
                return Ok(());
            }
            Ok(Err(e)) => {
                node_debug!(node.name, "Not ready on {}: {}", address, e);
            }
            Err(_) => {
                node_debug!(node.name, "Connect to {} timed out", address);
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        sleep(remaining.min(interval)).await;
    }
}
