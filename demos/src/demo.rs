use ln_testing_framework_core::{
    nodes::Amount,
    topology::{ChannelOpenPolicy, ChannelPolicyUpdate, Edge, TopologyDescriptor},
};
use ln_testing_framework_env as tf_env;
use tracing::warn;

pub const DEFAULT_NODES: usize = 4;

/// A ring needs the miner plus two payment nodes to carry a channel.
pub const MIN_NODES: usize = 3;

pub const DEFAULT_CHANNEL_CAPACITY_SATS: u64 = 1_000_000;

/// Ring size from `LN_DEMO_NODES`, or [`DEFAULT_NODES`].
#[must_use]
pub fn demo_nodes() -> usize {
    ring_size(tf_env::ln_demo_nodes().as_deref())
}

fn ring_size(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_NODES;
    };
    match raw.trim().parse::<usize>() {
        Ok(nodes) if nodes >= MIN_NODES => nodes,
        _ => {
            warn!(value = raw, default = DEFAULT_NODES, "ignoring LN_DEMO_NODES");
            DEFAULT_NODES
        }
    }
}

/// Node 0 mines and funds; every other node runs a payment endpoint.
///
/// The miner peers with node 1, payment nodes open channels around a ring and
/// every second channel gets fee terms at its far end.
#[must_use]
pub fn ring_topology(nodes: usize) -> TopologyDescriptor {
    let mut lightning = vec![true; nodes.max(1)];
    lightning[0] = false;
    let mut descriptor = TopologyDescriptor::with_nodes(&lightning);

    let payment_nodes: Vec<_> = (1..lightning.len()).collect();
    if let Some(&first) = payment_nodes.first() {
        descriptor = descriptor.with_edge(Edge::peer(0, first));
    }
    if payment_nodes.len() < 2 {
        return descriptor;
    }

    let capacity = Amount::from_sat(DEFAULT_CHANNEL_CAPACITY_SATS);
    for (position, &source) in payment_nodes.iter().enumerate() {
        let target = payment_nodes[(position + 1) % payment_nodes.len()];
        if payment_nodes.len() == 2 && position == 1 {
            // two nodes: one channel, plus a plain peer link back
            descriptor = descriptor.with_edge(Edge::peer(source, target));
            continue;
        }
        let mut edge = Edge::channel(source, target, ChannelOpenPolicy::new(capacity));
        if position % 2 == 0 {
            edge = edge.with_target_policy(ChannelPolicyUpdate {
                base_fee_msat: 1_000,
                fee_rate_ppm: 100,
                time_lock_delta: 40,
                min_htlc_msat: None,
                max_htlc_msat: None,
            });
        }
        descriptor = descriptor.with_edge(edge);
    }
    descriptor
}
