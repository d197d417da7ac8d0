use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use super::policy::{ChannelOpenPolicy, ChannelPolicyUpdate};
use crate::nodes::NodeIndex;

/// Directed edge of the base peer graph.
///
/// Policies may be written either structured or in flag form
/// (`source-policy: "--local_amt=100000 --push_amt=5000"`).
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Edge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "source-policy", skip_serializing_if = "Option::is_none")]
    pub source_policy: Option<ChannelOpenPolicy>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "target-policy", skip_serializing_if = "Option::is_none")]
    pub target_policy: Option<ChannelPolicyUpdate>,
}

impl Edge {
    #[must_use]
    pub const fn peer(source: NodeIndex, target: NodeIndex) -> Self {
        Self {
            source,
            target,
            source_policy: None,
            target_policy: None,
        }
    }

    #[must_use]
    pub fn channel(source: NodeIndex, target: NodeIndex, policy: ChannelOpenPolicy) -> Self {
        Self {
            source_policy: Some(policy),
            ..Self::peer(source, target)
        }
    }

    #[must_use]
    pub fn with_target_policy(mut self, policy: ChannelPolicyUpdate) -> Self {
        self.target_policy = Some(policy);
        self
    }

    #[must_use]
    pub const fn opens_channel(&self) -> bool {
        self.source_policy.is_some()
    }

    #[must_use]
    pub const fn has_policy(&self) -> bool {
        self.source_policy.is_some() || self.target_policy.is_some()
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{}->{}", self.source, self.target)
    }
}

/// Edge-labeled directed graph; edge order is the provisioning order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopologyGraph {
    edges: Vec<Edge>,
}

impl TopologyGraph {
    #[must_use]
    pub const fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges that only seed peer connectivity.
    pub fn peer_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|edge| !edge.opens_channel())
    }

    /// Edges that host a channel, in enumeration order.
    pub fn channel_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|edge| edge.opens_channel())
    }
}

impl FromIterator<Edge> for TopologyGraph {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
