pub mod descriptor;
pub mod graph;
pub mod invariants;
pub mod policy;
pub mod readiness;

pub use descriptor::{NodeDescriptor, TopologyDescriptor, load_topology};
pub use graph::{Edge, TopologyGraph};
pub use invariants::{validate_graph, validate_graph_against};
pub use policy::{ChannelOpenPolicy, ChannelPolicyUpdate, PolicyParseError};
