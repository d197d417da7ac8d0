use thiserror::Error;

use crate::{
    DynError,
    nodes::{Amount, FundingPoint, NodeIndex, ParseError, Txid},
    topology::readiness::ReadinessError,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("funding requires at least one payment-layer recipient")]
    NoRecipients,
    #[error(
        "funding balance {balance} cannot give {recipients} recipients a split of at least {granularity}"
    )]
    InsufficientFunds {
        balance: Amount,
        recipients: usize,
        granularity: Amount,
    },
    #[error("base_blocks ({base_blocks}) must exceed coinbase maturity ({coinbase_maturity})")]
    BaseBelowMaturity {
        base_blocks: u64,
        coinbase_maturity: u64,
    },
    #[error("{field} must be non-zero")]
    ZeroValue { field: &'static str },
    #[error("funding node {index} is not part of the deployment")]
    UnknownFundingNode { index: NodeIndex },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("topology references unknown node {index}")]
    UnknownNode { index: NodeIndex },
    #[error("node {index} has no payment-layer endpoint")]
    MissingEndpoint { index: NodeIndex },
    #[error("payment endpoint of node {index} exposes no reachable address")]
    UnreachableEndpoint { index: NodeIndex },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error(
        "channel {edge} funded at {funding_point}: funding output must be index 0 for deterministic short channel ids"
    )]
    NonZeroOutputIndex {
        edge: String,
        funding_point: FundingPoint,
    },
    #[error("channel {edge} funding tx {txid} still in mempool after its confirmation block")]
    FundingStillInMempool { edge: String, txid: Txid },
    #[error("channel {edge} confirmation has no short channel id: {source}")]
    UnencodableConfirmation {
        edge: String,
        #[source]
        source: ParseError,
    },
}

/// Failure of a provisioning run. Nothing is recovered locally.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    #[error(transparent)]
    Timeout(#[from] ReadinessError),
    #[error("{operation} on {node} failed: {source}")]
    Rpc {
        operation: &'static str,
        node: String,
        #[source]
        source: DynError,
    },
}

impl ProvisionError {
    /// Maps a capability failure into [`ProvisionError::Rpc`].
    pub fn rpc(operation: &'static str, node: impl Into<String>) -> impl FnOnce(DynError) -> Self {
        let node = node.into();
        move |source| Self::Rpc {
            operation,
            node,
            source,
        }
    }
}
