mod chain;
mod deployer;
mod error;
mod lightning;
mod network;
mod params;

pub use chain::SimChainDriver;
pub use deployer::{SimDeployer, SimDeployerError};
pub use error::SimError;
pub use lightning::SimLightningNode;
pub use network::{PolicyUpdateRecord, SimNetwork};
pub use params::SimParams;
