use std::{fs::File, path::Path};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::{Edge, TopologyGraph};
use crate::nodes::NodeIndex;

/// Launch-side description of a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDescriptor {
    /// Whether the node runs a payment-layer endpoint.
    #[serde(default)]
    pub lightning: bool,
}

/// Nodes and edges of a network to deploy. Node indices are positions in
/// `nodes`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologyDescriptor {
    pub nodes: Vec<NodeDescriptor>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl TopologyDescriptor {
    /// `lightning[i]` says whether node `i` runs a payment endpoint.
    #[must_use]
    pub fn with_nodes(lightning: &[bool]) -> Self {
        Self {
            nodes: lightning
                .iter()
                .map(|&lightning| NodeDescriptor { lightning })
                .collect(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    #[must_use]
    pub fn graph(&self) -> TopologyGraph {
        self.edges.iter().cloned().collect()
    }

    pub fn has_lightning(&self, index: NodeIndex) -> Option<bool> {
        self.nodes.get(index).map(|node| node.lightning)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parsing topology descriptor")
    }
}

pub fn load_topology(path: &Path) -> Result<TopologyDescriptor> {
    debug!(path = %path.display(), "loading topology descriptor");
    let file = File::open(path)
        .with_context(|| format!("opening topology descriptor at {}", path.display()))?;
    serde_yaml::from_reader(file).context("parsing topology descriptor")
}
