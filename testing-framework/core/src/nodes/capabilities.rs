use std::collections::HashSet;

use async_trait::async_trait;

use super::types::{Address, Amount, ChannelId, FundingPoint, NodeUri, Txid};
use crate::{
    DynError,
    topology::policy::{ChannelOpenPolicy, ChannelPolicyUpdate},
};

/// Wallet and block production on the underlying chain.
#[async_trait]
pub trait ChainDriver: Send + Sync {
    async fn new_address(&self) -> Result<Address, DynError>;

    /// Spendable wallet balance.
    async fn balance(&self) -> Result<Amount, DynError>;

    async fn send(&self, address: &Address, amount: Amount) -> Result<Txid, DynError>;

    /// Mines `blocks` blocks paying their coinbase to `address`.
    async fn mine(&self, blocks: u64, address: &Address) -> Result<(), DynError>;

    async fn mempool(&self) -> Result<HashSet<Txid>, DynError>;

    async fn height(&self) -> Result<u64, DynError>;
}

/// Payment-layer endpoint of a node.
#[async_trait]
pub trait LightningEndpoint: Send + Sync {
    async fn new_address(&self) -> Result<Address, DynError>;

    /// Confirmed on-chain balance as seen by the endpoint's own wallet.
    async fn confirmed_balance(&self) -> Result<Amount, DynError>;

    /// Connectable address, `None` until the endpoint is up.
    async fn reachable_address(&self) -> Result<Option<NodeUri>, DynError>;

    async fn connect_peer(&self, peer: &NodeUri) -> Result<(), DynError>;

    async fn open_channel(
        &self,
        peer: &NodeUri,
        policy: &ChannelOpenPolicy,
    ) -> Result<FundingPoint, DynError>;

    async fn update_channel_policy(
        &self,
        funding_point: &FundingPoint,
        policy: &ChannelPolicyUpdate,
    ) -> Result<(), DynError>;

    /// Channels this endpoint currently knows about network-wide.
    async fn global_channel_view(&self) -> Result<HashSet<ChannelId>, DynError>;
}
