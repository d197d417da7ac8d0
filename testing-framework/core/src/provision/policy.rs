use tracing::info;

use super::{ProvisionError, ProvisionedChannel};
use crate::nodes::NodeRegistry;

/// Applies `target-policy` updates once every endpoint has seen every channel.
pub struct PolicyApplier<'a> {
    registry: &'a NodeRegistry,
}

impl<'a> PolicyApplier<'a> {
    #[must_use]
    pub const fn new(registry: &'a NodeRegistry) -> Self {
        Self { registry }
    }

    /// Issues one update per channel carrying a target policy, at the channel's
    /// target node. Returns the number of updates issued.
    pub async fn apply(&self, channels: &[ProvisionedChannel]) -> Result<usize, ProvisionError> {
        let mut updates = 0;
        for channel in channels {
            let Some(policy) = channel.edge.target_policy.as_ref() else {
                continue;
            };
            let target = channel.edge.target;
            let endpoint = self.registry.require_payment_endpoint(target)?;
            endpoint
                .update_channel_policy(&channel.funding_point, policy)
                .await
                .map_err(ProvisionError::rpc("update_channel_policy", format!("node-{target}")))?;
            info!(
                edge = %channel.edge.label(),
                funding_point = %channel.funding_point,
                %policy,
                "target channel policy applied"
            );
            updates += 1;
        }
        Ok(updates)
    }
}
