mod config;
mod deployer;
mod report;
pub mod runtime;

pub use config::{ScenarioConfig, load_scenario_config};
pub use deployer::{Deployer, Deployment};
pub use report::{ChannelSummary, ReadinessReport};
pub use runtime::ScenarioDriver;
