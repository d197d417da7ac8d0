use std::time::Duration;

/// Base units per coin.
pub const COIN: u64 = 100_000_000;

/// Blocks mined to the funding address before the split. Must exceed the
/// chain's coinbase maturity so that the funding balance is spendable.
pub const DEFAULT_BASE_BLOCKS: u64 = 298;

/// Coinbase maturity window of a regtest chain.
pub const DEFAULT_COINBASE_MATURITY: u64 = 100;

/// Split granularity: funding is divided in whole coins by default.
pub const DEFAULT_SPLIT_GRANULARITY: u64 = COIN;

/// Blocks mined after the last channel open so every channel passes the
/// announcement depth before gossip polling starts.
pub const DEFAULT_POST_OPEN_CONFIRMATIONS: u64 = 10;

/// Default node index whose chain wallet funds the payment nodes.
pub const DEFAULT_FUNDING_NODE: usize = 0;

pub const DEFAULT_FUNDING_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_ENDPOINT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub const DEFAULT_MEMPOOL_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_GOSSIP_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Interval between work-list polls (endpoint and gossip barriers).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub const DEFAULT_FUNDING_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_MEMPOOL_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Position of a funding transaction inside its confirmation block: the
/// coinbase occupies index 0 and each block confirms exactly one open.
pub const FUNDING_TX_INDEX: u32 = 1;

/// Output index every funding point must carry.
pub const FUNDING_OUTPUT_INDEX: u32 = 0;
