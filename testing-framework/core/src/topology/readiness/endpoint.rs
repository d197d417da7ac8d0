use tracing::{debug, warn};

use super::{PollPolicy, ReadinessError, wait_for_each};
use crate::nodes::Node;

/// Waits until every payment endpoint in `nodes` exposes a connectable
/// address. Nodes without an endpoint are skipped.
pub async fn wait_endpoints_reachable(
    nodes: &[Node],
    policy: PollPolicy,
) -> Result<(), ReadinessError> {
    let pending = nodes
        .iter()
        .filter(|node| node.has_lightning())
        .cloned()
        .collect();

    wait_for_each("payment endpoint uris", policy, pending, |node: Node| async move {
        let Some(lightning) = node.lightning() else {
            return true;
        };
        match lightning.reachable_address().await {
            Ok(Some(uri)) => {
                debug!(target: "readiness", node = %node, %uri, "payment endpoint reachable");
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!(
                    target: "readiness",
                    node = %node,
                    error = %err,
                    "endpoint readiness: failed to fetch uri"
                );
                false
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::Instant;

    use super::*;
    use crate::provision::test_support::{FakeChain, FakeLightning};

    #[tokio::test(start_paused = true)]
    async fn nodes_without_endpoints_are_skipped() {
        let chain = Arc::new(FakeChain::default());
        let endpoint = Arc::new(FakeLightning::new(1, chain.clone()));
        let nodes = vec![
            Node::new(0, chain.clone(), None),
            Node::new(1, chain.clone(), Some(endpoint)),
        ];
        let started = Instant::now();

        wait_endpoints_reachable(
            &nodes,
            PollPolicy::new(Duration::from_secs(30), Duration::from_secs(5)),
        )
        .await
        .unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
