//! Steps that turn a deployed registry into a funded, connected payment graph.

pub mod channels;
pub mod error;
pub mod funding;
pub mod policy;
pub mod replicate;

#[cfg(test)]
pub(crate) mod test_support;

pub use channels::{ChannelProvisioner, ProvisionedChannel};
pub use error::{ConfigurationError, InvariantViolation, PreconditionError, ProvisionError};
pub use funding::{FundingDistributor, FundingRound, collect_recipient_addresses, compute_split};
pub use policy::PolicyApplier;
pub use replicate::TopologyReplicator;
