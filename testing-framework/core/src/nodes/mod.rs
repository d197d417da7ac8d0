pub mod capabilities;
pub mod registry;
pub mod types;

pub use capabilities::{ChainDriver, LightningEndpoint};
pub use registry::{Node, NodeIndex, NodeRegistry};
pub use types::{
    Address, Amount, ChannelId, FundingPoint, NodeUri, ParseError, ShortChannelId, Txid,
};
