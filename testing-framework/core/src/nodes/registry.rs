use std::{
    fmt::{self, Display, Formatter},
    sync::Arc,
};

use super::capabilities::{ChainDriver, LightningEndpoint};
use crate::provision::{ConfigurationError, PreconditionError};

pub type NodeIndex = usize;

/// A participant of the deployed network.
#[derive(Clone)]
pub struct Node {
    index: NodeIndex,
    chain: Arc<dyn ChainDriver>,
    lightning: Option<Arc<dyn LightningEndpoint>>,
}

impl Node {
    #[must_use]
    pub fn new(
        index: NodeIndex,
        chain: Arc<dyn ChainDriver>,
        lightning: Option<Arc<dyn LightningEndpoint>>,
    ) -> Self {
        Self {
            index,
            chain,
            lightning,
        }
    }

    #[must_use]
    pub const fn index(&self) -> NodeIndex {
        self.index
    }

    #[must_use]
    pub fn chain(&self) -> &Arc<dyn ChainDriver> {
        &self.chain
    }

    #[must_use]
    pub fn lightning(&self) -> Option<&Arc<dyn LightningEndpoint>> {
        self.lightning.as_ref()
    }

    #[must_use]
    pub const fn has_lightning(&self) -> bool {
        self.lightning.is_some()
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.index)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("index", &self.index)
            .field("lightning", &self.lightning.is_some())
            .finish_non_exhaustive()
    }
}

/// All nodes of a deployment, in enumeration order.
#[derive(Clone, Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
}

impl NodeRegistry {
    #[must_use]
    pub const fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.iter().find(|node| node.index == index)
    }

    /// Nodes running a payment-layer endpoint.
    #[must_use]
    pub fn list_payment_nodes(&self) -> Vec<Node> {
        self.nodes
            .iter()
            .filter(|node| node.has_lightning())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn payment_endpoint(&self, index: NodeIndex) -> Option<Arc<dyn LightningEndpoint>> {
        self.get(index).and_then(|node| node.lightning.clone())
    }

    /// Endpoint of `index`, failing when the node is unknown or has none.
    pub fn require_payment_endpoint(
        &self,
        index: NodeIndex,
    ) -> Result<Arc<dyn LightningEndpoint>, PreconditionError> {
        let node = self
            .get(index)
            .ok_or(PreconditionError::UnknownNode { index })?;
        node.lightning
            .clone()
            .ok_or(PreconditionError::MissingEndpoint { index })
    }

    /// Node whose chain wallet pays for the funding round.
    pub fn funding_source(&self, index: NodeIndex) -> Result<&Node, ConfigurationError> {
        self.get(index)
            .ok_or(ConfigurationError::UnknownFundingNode { index })
    }
}
