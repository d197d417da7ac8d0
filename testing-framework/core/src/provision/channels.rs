use serde::Serialize;
use tracing::info;

use super::{InvariantViolation, PreconditionError, ProvisionError};
use crate::{
    constants::{FUNDING_OUTPUT_INDEX, FUNDING_TX_INDEX},
    nodes::{Address, ChainDriver, FundingPoint, NodeRegistry, ShortChannelId},
    topology::{
        ChannelOpenPolicy, Edge, TopologyGraph,
        readiness::{MempoolReadiness, PollPolicy, ReadinessCheck as _},
    },
};

/// A channel opened on a `source-policy` edge and mined into its own block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProvisionedChannel {
    pub edge: Edge,
    pub funding_point: FundingPoint,
    pub confirmation_height: u64,
    /// Derived from the confirmation block: the funding tx is the block's only
    /// non-coinbase transaction and spends to output 0.
    pub short_channel_id: ShortChannelId,
}

/// Opens channels strictly one per confirmation block, in edge order.
///
/// Interleaving unconfirmed funding transactions in one block would make the
/// short channel ids depend on mempool ordering, so every open is mined
/// before the next is requested.
pub struct ChannelProvisioner<'a> {
    registry: &'a NodeRegistry,
    chain: &'a dyn ChainDriver,
    mining_address: &'a Address,
    mempool_policy: PollPolicy,
    post_open_confirmations: u64,
}

impl<'a> ChannelProvisioner<'a> {
    #[must_use]
    pub const fn new(
        registry: &'a NodeRegistry,
        chain: &'a dyn ChainDriver,
        mining_address: &'a Address,
        mempool_policy: PollPolicy,
        post_open_confirmations: u64,
    ) -> Self {
        Self {
            registry,
            chain,
            mining_address,
            mempool_policy,
            post_open_confirmations,
        }
    }

    pub async fn open_all(
        &self,
        graph: &TopologyGraph,
    ) -> Result<Vec<ProvisionedChannel>, ProvisionError> {
        info!("opening channels, one per block");
        let mut channels = Vec::new();
        for edge in graph.channel_edges() {
            let Some(policy) = edge.source_policy.as_ref() else {
                continue;
            };
            channels.push(self.open(edge, policy).await?);
        }

        // push every channel past the announcement depth before gossip polling
        self.mine(self.post_open_confirmations).await?;
        info!(
            channels = channels.len(),
            confirmations = self.post_open_confirmations,
            "channel opens buried"
        );
        Ok(channels)
    }

    async fn open(
        &self,
        edge: &Edge,
        policy: &ChannelOpenPolicy,
    ) -> Result<ProvisionedChannel, ProvisionError> {
        let source = self.registry.require_payment_endpoint(edge.source)?;
        let target = self.registry.require_payment_endpoint(edge.target)?;
        let target_uri = target
            .reachable_address()
            .await
            .map_err(ProvisionError::rpc("reachable_address", format!("node-{}", edge.target)))?
            .ok_or(PreconditionError::UnreachableEndpoint { index: edge.target })?;

        info!(edge = %edge.label(), %policy, "opening channel");
        let funding_point = source
            .open_channel(&target_uri, policy)
            .await
            .map_err(ProvisionError::rpc("open_channel", format!("node-{}", edge.source)))?;

        // The funding output is index 0 only while the change output is the
        // larger one; anything else breaks short channel id derivation.
        if funding_point.output_index != FUNDING_OUTPUT_INDEX {
            return Err(InvariantViolation::NonZeroOutputIndex {
                edge: edge.label(),
                funding_point,
            }
            .into());
        }
        info!(edge = %edge.label(), %funding_point, "pending channel point");

        let txid = funding_point.txid;
        MempoolReadiness::new(self.chain, txid, self.mempool_policy)
            .wait()
            .await?;

        self.mine(1).await?;
        let mempool = self
            .chain
            .mempool()
            .await
            .map_err(ProvisionError::rpc("mempool", "chain"))?;
        if mempool.contains(&txid) {
            return Err(InvariantViolation::FundingStillInMempool {
                edge: edge.label(),
                txid,
            }
            .into());
        }

        let confirmation_height = self
            .chain
            .height()
            .await
            .map_err(ProvisionError::rpc("height", "chain"))?;
        let short_channel_id = ShortChannelId::new(
            confirmation_height,
            u64::from(FUNDING_TX_INDEX),
            u64::from(FUNDING_OUTPUT_INDEX),
        )
        .map_err(|source| InvariantViolation::UnencodableConfirmation {
            edge: edge.label(),
            source,
        })?;
        info!(
            edge = %edge.label(),
            height = confirmation_height,
            %short_channel_id,
            "channel confirmed"
        );

        Ok(ProvisionedChannel {
            edge: edge.clone(),
            funding_point,
            confirmation_height,
            short_channel_id,
        })
    }

    async fn mine(&self, blocks: u64) -> Result<(), ProvisionError> {
        self.chain
            .mine(blocks, self.mining_address)
            .await
            .map_err(ProvisionError::rpc("mine", "chain"))
    }
}
