use super::graph::TopologyGraph;
use crate::{
    nodes::{NodeIndex, NodeRegistry},
    provision::PreconditionError,
};

/// Validate edge endpoints against the deployed nodes.
///
/// Every edge must reference known nodes, and an edge carrying a policy
/// annotation needs a payment endpoint on both sides.
pub fn validate_graph(
    graph: &TopologyGraph,
    has_lightning: impl Fn(NodeIndex) -> Option<bool>,
) -> Result<(), PreconditionError> {
    for edge in graph.edges() {
        for index in [edge.source, edge.target] {
            let lightning = has_lightning(index).ok_or(PreconditionError::UnknownNode { index })?;
            if edge.has_policy() && !lightning {
                return Err(PreconditionError::MissingEndpoint { index });
            }
        }
    }

    Ok(())
}

pub fn validate_graph_against(
    graph: &TopologyGraph,
    registry: &NodeRegistry,
) -> Result<(), PreconditionError> {
    validate_graph(graph, |index| {
        registry.get(index).map(|node| node.has_lightning())
    })
}
