use std::{fs::File, path::Path, time::Duration};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, DurationSeconds, serde_as};
use tracing::debug;

use crate::{
    constants::{
        DEFAULT_BASE_BLOCKS, DEFAULT_COINBASE_MATURITY, DEFAULT_ENDPOINT_TIMEOUT,
        DEFAULT_FUNDING_NODE, DEFAULT_FUNDING_POLL_INTERVAL, DEFAULT_FUNDING_TIMEOUT,
        DEFAULT_GOSSIP_TIMEOUT, DEFAULT_MEMPOOL_POLL_INTERVAL, DEFAULT_MEMPOOL_TIMEOUT,
        DEFAULT_POLL_INTERVAL, DEFAULT_POST_OPEN_CONFIRMATIONS, DEFAULT_SPLIT_GRANULARITY,
    },
    nodes::{Amount, NodeIndex},
    provision::ConfigurationError,
    topology::readiness::PollPolicy,
};

/// Tunables of one provisioning run. Every field has a default, so an empty
/// YAML document is a valid configuration.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Node whose chain wallet mines the base and funds everyone.
    pub funding_node: NodeIndex,
    pub base_blocks: u64,
    pub coinbase_maturity: u64,
    pub split_granularity_sats: Amount,
    pub post_open_confirmations: u64,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub funding_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub endpoint_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub mempool_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub gossip_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub poll_interval: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub funding_poll_interval: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub mempool_poll_interval: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            funding_node: DEFAULT_FUNDING_NODE,
            base_blocks: DEFAULT_BASE_BLOCKS,
            coinbase_maturity: DEFAULT_COINBASE_MATURITY,
            split_granularity_sats: Amount::from_sat(DEFAULT_SPLIT_GRANULARITY),
            post_open_confirmations: DEFAULT_POST_OPEN_CONFIRMATIONS,
            funding_timeout: DEFAULT_FUNDING_TIMEOUT,
            endpoint_timeout: DEFAULT_ENDPOINT_TIMEOUT,
            mempool_timeout: DEFAULT_MEMPOOL_TIMEOUT,
            gossip_timeout: DEFAULT_GOSSIP_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            funding_poll_interval: DEFAULT_FUNDING_POLL_INTERVAL,
            mempool_poll_interval: DEFAULT_MEMPOOL_POLL_INTERVAL,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.base_blocks <= self.coinbase_maturity {
            return Err(ConfigurationError::BaseBelowMaturity {
                base_blocks: self.base_blocks,
                coinbase_maturity: self.coinbase_maturity,
            });
        }
        if self.split_granularity_sats == Amount::ZERO {
            return Err(ConfigurationError::ZeroValue {
                field: "split_granularity_sats",
            });
        }

        let intervals = [
            ("poll_interval", self.poll_interval),
            ("funding_poll_interval", self.funding_poll_interval),
            ("mempool_poll_interval", self.mempool_poll_interval),
        ];
        for (field, interval) in intervals {
            if interval.is_zero() {
                return Err(ConfigurationError::ZeroValue { field });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn funding_policy(&self) -> PollPolicy {
        PollPolicy::new(self.funding_timeout, self.funding_poll_interval).adjusted()
    }

    #[must_use]
    pub fn endpoint_policy(&self) -> PollPolicy {
        PollPolicy::new(self.endpoint_timeout, self.poll_interval).adjusted()
    }

    #[must_use]
    pub fn mempool_policy(&self) -> PollPolicy {
        PollPolicy::new(self.mempool_timeout, self.mempool_poll_interval).adjusted()
    }

    #[must_use]
    pub fn gossip_policy(&self) -> PollPolicy {
        PollPolicy::new(self.gossip_timeout, self.poll_interval).adjusted()
    }
}

pub fn load_scenario_config(path: &Path) -> Result<ScenarioConfig> {
    debug!(path = %path.display(), "loading scenario config");
    let file = File::open(path)
        .with_context(|| format!("opening scenario config at {}", path.display()))?;
    let config: ScenarioConfig =
        serde_yaml::from_reader(file).context("parsing scenario config")?;
    config
        .validate()
        .with_context(|| format!("validating scenario config at {}", path.display()))?;
    Ok(config)
}
