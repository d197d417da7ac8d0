use ln_testing_framework_core::nodes::{Address, Amount, FundingPoint, NodeIndex, ParseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulated network state is poisoned")]
    Poisoned,
    #[error("address {address} belongs to no simulated wallet")]
    UnknownAddress { address: Address },
    #[error("insufficient funds: {available} available, {requested} requested")]
    InsufficientFunds { available: Amount, requested: Amount },
    #[error("node {index} runs no payment endpoint")]
    NoEndpoint { index: NodeIndex },
    #[error("no payment endpoint with pubkey {pubkey}")]
    UnknownPeer { pubkey: String },
    #[error("node {index} cannot open a channel to itself")]
    SelfChannel { index: NodeIndex },
    #[error("push amount {push} exceeds channel capacity {capacity}")]
    PushExceedsCapacity { push: Amount, capacity: Amount },
    #[error("no channel funded at {funding_point}")]
    UnknownChannel { funding_point: FundingPoint },
    #[error("node {index} is not a party of channel {funding_point}")]
    NotChannelParty {
        index: NodeIndex,
        funding_point: FundingPoint,
    },
    #[error("channel {funding_point} is not confirmed")]
    UnconfirmedChannel { funding_point: FundingPoint },
    #[error("block position cannot be encoded: {0}")]
    BlockPosition(#[from] ParseError),
}
