use tracing::{debug, warn};

use super::{PollPolicy, ReadinessError, wait_for_each};
use crate::nodes::Node;

/// Waits until every payment endpoint's global channel view holds exactly
/// `expected_channels` channels.
pub async fn wait_gossip_converged(
    nodes: &[Node],
    expected_channels: usize,
    policy: PollPolicy,
) -> Result<(), ReadinessError> {
    let pending = nodes
        .iter()
        .filter(|node| node.has_lightning())
        .cloned()
        .collect();

    wait_for_each("channel graph gossip", policy, pending, |node: Node| async move {
        let Some(lightning) = node.lightning() else {
            return true;
        };
        match lightning.global_channel_view().await {
            Ok(view) => {
                debug!(
                    target: "readiness",
                    node = %node,
                    known = view.len(),
                    expected = expected_channels,
                    "channel graph view"
                );
                view.len() == expected_channels
            }
            Err(err) => {
                warn!(
                    target: "readiness",
                    node = %node,
                    error = %err,
                    "gossip readiness: failed to fetch channel graph"
                );
                false
            }
        }
    })
    .await
}
