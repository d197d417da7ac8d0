use std::time::Duration;

use ln_testing_framework_core::{
    constants::DEFAULT_COINBASE_MATURITY,
    nodes::Amount,
};

/// Behavior of the simulated chain and its payment nodes.
#[derive(Clone, Debug)]
pub struct SimParams {
    pub block_reward: Amount,
    /// Confirmations a coinbase needs before it is spendable.
    pub coinbase_maturity: u64,
    /// Flat fee charged per transaction.
    pub fee: Amount,
    /// Time after deployment before a payment node exposes its uri.
    pub endpoint_ready_after: Duration,
    /// Confirmations before a channel is announced.
    pub gossip_depth: u64,
    /// Time for an announcement to reach nodes outside the channel.
    pub gossip_delay: Duration,
    /// Seed for txids, addresses and node keys.
    pub seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            block_reward: Amount::from_coins(50),
            coinbase_maturity: DEFAULT_COINBASE_MATURITY,
            fee: Amount::ZERO,
            endpoint_ready_after: Duration::ZERO,
            gossip_depth: 6,
            gossip_delay: Duration::from_secs(2),
            seed: 0,
        }
    }
}
