use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use ln_testing_framework_core::{
    DynError,
    nodes::{Address, Amount, ChannelId, FundingPoint, LightningEndpoint, NodeIndex, NodeUri},
    topology::{ChannelOpenPolicy, ChannelPolicyUpdate},
};
use tracing::debug;

use crate::network::SimNetwork;

/// Payment-layer endpoint of one simulated node, with its own wallet.
pub struct SimLightningNode {
    network: Arc<SimNetwork>,
    index: NodeIndex,
}

impl SimLightningNode {
    pub(crate) const fn new(network: Arc<SimNetwork>, index: NodeIndex) -> Self {
        Self { network, index }
    }
}

#[async_trait]
impl LightningEndpoint for SimLightningNode {
    async fn new_address(&self) -> Result<Address, DynError> {
        let wallet = self.network.endpoint_wallet(self.index)?;
        Ok(self.network.new_address(wallet)?)
    }

    async fn confirmed_balance(&self) -> Result<Amount, DynError> {
        let wallet = self.network.endpoint_wallet(self.index)?;
        Ok(self.network.balance(wallet)?)
    }

    async fn reachable_address(&self) -> Result<Option<NodeUri>, DynError> {
        Ok(self.network.reachable_address(self.index)?)
    }

    async fn connect_peer(&self, peer: &NodeUri) -> Result<(), DynError> {
        debug!(node = self.index, %peer, "sim: connect");
        Ok(self.network.connect(self.index, peer)?)
    }

    async fn open_channel(
        &self,
        peer: &NodeUri,
        policy: &ChannelOpenPolicy,
    ) -> Result<FundingPoint, DynError> {
        Ok(self.network.open_channel(self.index, peer, policy)?)
    }

    async fn update_channel_policy(
        &self,
        funding_point: &FundingPoint,
        policy: &ChannelPolicyUpdate,
    ) -> Result<(), DynError> {
        debug!(node = self.index, %funding_point, %policy, "sim: update channel policy");
        Ok(self
            .network
            .update_channel_policy(self.index, funding_point, policy)?)
    }

    async fn global_channel_view(&self) -> Result<HashSet<ChannelId>, DynError> {
        Ok(self.network.channel_view(self.index)?)
    }
}
