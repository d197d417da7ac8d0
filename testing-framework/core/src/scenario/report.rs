use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::{
    nodes::{Amount, FundingPoint, ShortChannelId},
    provision::ProvisionedChannel,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    pub source: usize,
    pub target: usize,
    pub funding_point: FundingPoint,
    pub confirmation_height: u64,
    pub short_channel_id: ShortChannelId,
    pub policy_updated: bool,
}

impl From<&ProvisionedChannel> for ChannelSummary {
    fn from(channel: &ProvisionedChannel) -> Self {
        Self {
            source: channel.edge.source,
            target: channel.edge.target,
            funding_point: channel.funding_point,
            confirmation_height: channel.confirmation_height,
            short_channel_id: channel.short_channel_id,
            policy_updated: channel.edge.target_policy.is_some(),
        }
    }
}

/// Outcome of a successful provisioning run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    pub nodes: usize,
    pub channels: Vec<ChannelSummary>,
    pub split: Amount,
    pub peer_connections: usize,
    pub policy_updates: usize,
    pub final_height: u64,
}

impl ReadinessReport {
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl Display for ReadinessReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LN ready with {} nodes and {} channels.",
            self.nodes,
            self.channel_count()
        )
    }
}
