use std::time::Duration;

use tracing::warn;

use super::{PollPolicy, ReadinessCheck};
use crate::{DynError, nodes::{Amount, Node}};

#[derive(Debug)]
pub struct NodeBalanceStatus {
    label: String,
    result: Result<Amount, DynError>,
}

/// Every payment node's wallet reports at least `split` confirmed.
pub struct FundingReadiness<'a> {
    pub(crate) nodes: &'a [Node],
    pub(crate) split: Amount,
    pub(crate) policy: PollPolicy,
}

impl<'a> FundingReadiness<'a> {
    #[must_use]
    pub const fn new(nodes: &'a [Node], split: Amount, policy: PollPolicy) -> Self {
        Self {
            nodes,
            split,
            policy,
        }
    }
}

#[async_trait::async_trait]
impl<'a> ReadinessCheck<'a> for FundingReadiness<'a> {
    type Data = Vec<NodeBalanceStatus>;

    async fn collect(&'a self) -> Self::Data {
        let futures = self
            .nodes
            .iter()
            .filter_map(|node| node.lightning().map(|ln| (node.label(), ln)))
            .map(|(label, lightning)| async move {
                let result = lightning.confirmed_balance().await;
                if let Err(err) = &result {
                    warn!(
                        target: "readiness",
                        node = %label,
                        error = %err,
                        "funding readiness: failed to fetch confirmed balance"
                    );
                }
                NodeBalanceStatus { label, result }
            });
        futures::future::join_all(futures).await
    }

    fn is_ready(&self, data: &Self::Data) -> bool {
        data.iter()
            .all(|status| matches!(status.result, Ok(balance) if balance >= self.split))
    }

    fn timeout_message(&self, data: Self::Data) -> String {
        let summary = data
            .iter()
            .map(|status| match &status.result {
                Ok(balance) => format!(
                    "{}: confirmed={balance}, expected>={}",
                    status.label, self.split
                ),
                Err(err) => format!("{}: error={err}", status.label),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("timed out waiting for funds to confirm: {summary}")
    }

    fn poll_interval(&self) -> Duration {
        self.policy.interval
    }

    fn timeout(&self) -> Duration {
        self.policy.timeout
    }
}
