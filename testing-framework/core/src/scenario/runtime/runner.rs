use tracing::info;

use crate::{
    provision::{
        ChannelProvisioner, FundingDistributor, PolicyApplier, ProvisionError, TopologyReplicator,
        collect_recipient_addresses,
    },
    scenario::{ChannelSummary, Deployment, ReadinessReport, ScenarioConfig},
    topology::{
        readiness::{
            FundingReadiness, ReadinessCheck as _, wait_endpoints_reachable, wait_gossip_converged,
        },
        validate_graph_against,
    },
};

/// Drives a deployed network from bare nodes to a gossiped, policy-tuned
/// payment-channel graph.
pub struct ScenarioDriver {
    deployment: Deployment,
    config: ScenarioConfig,
}

impl ScenarioDriver {
    #[must_use]
    pub const fn new(deployment: Deployment, config: ScenarioConfig) -> Self {
        Self { deployment, config }
    }

    #[must_use]
    pub const fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    #[must_use]
    pub const fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Runs every provisioning stage in order. The first failure aborts the
    /// run; nothing is rolled back.
    pub async fn run(&self) -> Result<ReadinessReport, ProvisionError> {
        let registry = &self.deployment.registry;
        let graph = &self.deployment.graph;

        self.config.validate()?;
        validate_graph_against(graph, registry)?;
        let source = registry.funding_source(self.config.funding_node)?;
        let chain = source.chain().as_ref();

        let payment_nodes = registry.list_payment_nodes();
        info!(
            nodes = registry.len(),
            payment_nodes = payment_nodes.len(),
            edges = graph.edges().len(),
            funding_node = %source,
            "provisioning payment network"
        );

        let recipients = collect_recipient_addresses(&payment_nodes).await?;
        let round = FundingDistributor::new(
            source,
            self.config.base_blocks,
            self.config.split_granularity_sats,
        )
        .distribute(recipients)
        .await?;
        info!(
            split = %round.split,
            total = %round.total(),
            recipients = round.recipients.len(),
            "funding distributed"
        );

        FundingReadiness::new(&payment_nodes, round.split, self.config.funding_policy())
            .wait()
            .await?;
        info!(nodes = payment_nodes.len(), "funding confirmed");

        wait_endpoints_reachable(&payment_nodes, self.config.endpoint_policy()).await?;
        info!(nodes = payment_nodes.len(), "payment endpoints reachable");

        let peer_connections = TopologyReplicator::new(registry).replicate(graph).await?;

        let channels = ChannelProvisioner::new(
            registry,
            chain,
            &round.source_address,
            self.config.mempool_policy(),
            self.config.post_open_confirmations,
        )
        .open_all(graph)
        .await?;

        wait_gossip_converged(&payment_nodes, channels.len(), self.config.gossip_policy()).await?;
        info!(channels = channels.len(), "channel gossip converged");

        let policy_updates = PolicyApplier::new(registry).apply(&channels).await?;
        info!(updates = policy_updates, "target policies applied");

        let final_height = chain
            .height()
            .await
            .map_err(ProvisionError::rpc("height", source.label()))?;

        let report = ReadinessReport {
            nodes: payment_nodes.len(),
            channels: channels.iter().map(ChannelSummary::from).collect(),
            split: round.split,
            peer_connections,
            policy_updates,
            final_height,
        };
        info!(height = final_height, "{report}");
        Ok(report)
    }
}
