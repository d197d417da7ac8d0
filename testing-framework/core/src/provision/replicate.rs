use tracing::{debug, info};

use super::{PreconditionError, ProvisionError};
use crate::{nodes::NodeRegistry, topology::TopologyGraph};

/// Copies the base graph's plain peer edges onto the payment layer so the
/// payment network has redundant gossip paths.
pub struct TopologyReplicator<'a> {
    registry: &'a NodeRegistry,
}

impl<'a> TopologyReplicator<'a> {
    #[must_use]
    pub const fn new(registry: &'a NodeRegistry) -> Self {
        Self { registry }
    }

    /// Returns the number of connect requests issued.
    pub async fn replicate(&self, graph: &TopologyGraph) -> Result<usize, ProvisionError> {
        let mut connects = 0;
        for edge in graph.peer_edges() {
            let (Some(source), Some(target)) = (
                self.registry.payment_endpoint(edge.source),
                self.registry.payment_endpoint(edge.target),
            ) else {
                debug!(edge = %edge.label(), "skipping peer edge without payment endpoints");
                continue;
            };

            let target_uri = target
                .reachable_address()
                .await
                .map_err(ProvisionError::rpc("reachable_address", format!("node-{}", edge.target)))?
                .ok_or(PreconditionError::UnreachableEndpoint { index: edge.target })?;

            source
                .connect_peer(&target_uri)
                .await
                .map_err(ProvisionError::rpc("connect_peer", format!("node-{}", edge.source)))?;
            debug!(edge = %edge.label(), uri = %target_uri, "payment peer connection requested");
            connects += 1;
        }

        info!(connects, "replicated base topology onto payment layer");
        Ok(connects)
    }
}
