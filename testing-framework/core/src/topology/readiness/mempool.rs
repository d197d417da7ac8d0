use std::time::Duration;

use tracing::warn;

use super::{PollPolicy, ReadinessCheck};
use crate::{
    DynError,
    nodes::{ChainDriver, Txid},
};

/// A broadcast transaction shows up in the shared mempool.
pub struct MempoolReadiness<'a> {
    pub(crate) chain: &'a dyn ChainDriver,
    pub(crate) txid: Txid,
    pub(crate) policy: PollPolicy,
}

impl<'a> MempoolReadiness<'a> {
    #[must_use]
    pub const fn new(chain: &'a dyn ChainDriver, txid: Txid, policy: PollPolicy) -> Self {
        Self {
            chain,
            txid,
            policy,
        }
    }
}

#[async_trait::async_trait]
impl<'a> ReadinessCheck<'a> for MempoolReadiness<'a> {
    type Data = Result<bool, DynError>;

    async fn collect(&'a self) -> Self::Data {
        let result = self
            .chain
            .mempool()
            .await
            .map(|mempool| mempool.contains(&self.txid));
        if let Err(err) = &result {
            warn!(
                target: "readiness",
                txid = %self.txid,
                error = %err,
                "mempool readiness: failed to fetch mempool"
            );
        }
        result
    }

    fn is_ready(&self, data: &Self::Data) -> bool {
        matches!(data, Ok(true))
    }

    fn timeout_message(&self, data: Self::Data) -> String {
        match data {
            Ok(_) => format!("timed out waiting for tx {} to enter the mempool", self.txid),
            Err(err) => format!(
                "timed out waiting for tx {} to enter the mempool: last error={err}",
                self.txid
            ),
        }
    }

    fn poll_interval(&self) -> Duration {
        self.policy.interval
    }

    fn timeout(&self) -> Duration {
        self.policy.timeout
    }
}
