use std::sync::Arc;

use async_trait::async_trait;
use ln_testing_framework_core::{
    nodes::{ChainDriver, LightningEndpoint, Node, NodeRegistry},
    scenario::{Deployer, Deployment},
    topology::TopologyDescriptor,
};
use thiserror::Error;
use tracing::info;

use crate::{SimChainDriver, SimError, SimLightningNode, SimNetwork, SimParams};

/// Deploys a topology onto one in-memory [`SimNetwork`].
pub struct SimDeployer {
    network: Arc<SimNetwork>,
}

#[derive(Debug, Error)]
pub enum SimDeployerError {
    #[error("topology has no nodes")]
    EmptyTopology,
    #[error("simulated network already hosts a deployment")]
    AlreadyDeployed,
    #[error(transparent)]
    Sim(#[from] SimError),
}

impl SimDeployer {
    #[must_use]
    pub fn new(params: SimParams) -> Self {
        Self {
            network: Arc::new(SimNetwork::new(params)),
        }
    }

    /// Network backing the deployed nodes, for inspection.
    #[must_use]
    pub fn network(&self) -> Arc<SimNetwork> {
        Arc::clone(&self.network)
    }
}

impl Default for SimDeployer {
    fn default() -> Self {
        Self::new(SimParams::default())
    }
}

#[async_trait]
impl Deployer for SimDeployer {
    type Error = SimDeployerError;

    async fn deploy(&self, descriptor: &TopologyDescriptor) -> Result<Deployment, Self::Error> {
        if descriptor.nodes.is_empty() {
            return Err(SimDeployerError::EmptyTopology);
        }
        if self.network.is_deployed()? {
            return Err(SimDeployerError::AlreadyDeployed);
        }

        let mut nodes = Vec::with_capacity(descriptor.nodes.len());
        for (index, node) in descriptor.nodes.iter().enumerate() {
            let wallet = self.network.add_wallet()?;
            let chain: Arc<dyn ChainDriver> =
                Arc::new(SimChainDriver::new(Arc::clone(&self.network), wallet));

            let lightning = if node.lightning {
                let wallet = self.network.add_wallet()?;
                self.network.add_endpoint(index, wallet)?;
                let endpoint: Arc<dyn LightningEndpoint> =
                    Arc::new(SimLightningNode::new(Arc::clone(&self.network), index));
                Some(endpoint)
            } else {
                None
            };
            nodes.push(Node::new(index, chain, lightning));
        }

        let registry = NodeRegistry::new(nodes);
        info!(
            nodes = registry.len(),
            payment_nodes = registry.list_payment_nodes().len(),
            edges = descriptor.edges.len(),
            "simulated network deployed"
        );
        Ok(Deployment::new(registry, descriptor.graph()))
    }
}
