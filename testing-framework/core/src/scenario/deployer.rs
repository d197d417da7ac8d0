use async_trait::async_trait;

use crate::{
    nodes::NodeRegistry,
    topology::{TopologyDescriptor, TopologyGraph},
};

/// Nodes brought up for a topology, together with the graph to provision.
#[derive(Clone, Debug)]
pub struct Deployment {
    pub registry: NodeRegistry,
    pub graph: TopologyGraph,
}

impl Deployment {
    #[must_use]
    pub const fn new(registry: NodeRegistry, graph: TopologyGraph) -> Self {
        Self { registry, graph }
    }
}

/// Materializes a topology descriptor into running nodes.
#[async_trait]
pub trait Deployer: Send + Sync {
    type Error;

    async fn deploy(&self, descriptor: &TopologyDescriptor) -> Result<Deployment, Self::Error>;
}
