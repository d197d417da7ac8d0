use tracing::{debug, info};

use super::{ConfigurationError, ProvisionError};
use crate::nodes::{Address, Amount, ChainDriver, Node};

/// One disbursement of the funding source's balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundingRound {
    /// Funding-source address receiving every mined coinbase.
    pub source_address: Address,
    pub split: Amount,
    pub recipients: Vec<Address>,
}

impl FundingRound {
    #[must_use]
    pub fn total(&self) -> Amount {
        self.recipients.iter().map(|_| self.split).sum()
    }
}

/// Even split of `balance` across `recipients`, floored to a multiple of
/// `granularity`.
pub fn compute_split(
    balance: Amount,
    recipients: usize,
    granularity: Amount,
) -> Result<Amount, ConfigurationError> {
    if recipients == 0 {
        return Err(ConfigurationError::NoRecipients);
    }
    if granularity == Amount::ZERO {
        return Err(ConfigurationError::ZeroValue {
            field: "split_granularity",
        });
    }

    let insufficient = ConfigurationError::InsufficientFunds {
        balance,
        recipients,
        granularity,
    };
    let step = granularity
        .checked_mul(recipients as u64)
        .ok_or_else(|| insufficient.clone())?;
    let units = balance.to_sat() / step.to_sat();
    if units == 0 {
        return Err(insufficient);
    }

    granularity.checked_mul(units).ok_or(insufficient)
}

/// Asks every payment node for a fresh on-chain address, in registry order.
pub async fn collect_recipient_addresses(
    payment_nodes: &[Node],
) -> Result<Vec<Address>, ProvisionError> {
    let mut addresses = Vec::with_capacity(payment_nodes.len());
    for node in payment_nodes {
        let Some(lightning) = node.lightning() else {
            continue;
        };
        let address = lightning
            .new_address()
            .await
            .map_err(ProvisionError::rpc("new_address", node.label()))?;
        debug!(node = %node, %address, "payment node funding address");
        addresses.push(address);
    }
    Ok(addresses)
}

/// Mines a spendable base to the funding source and splits it evenly.
pub struct FundingDistributor<'a> {
    chain: &'a dyn ChainDriver,
    label: String,
    base_blocks: u64,
    granularity: Amount,
}

impl<'a> FundingDistributor<'a> {
    #[must_use]
    pub fn new(source: &'a Node, base_blocks: u64, granularity: Amount) -> Self {
        Self {
            chain: source.chain().as_ref(),
            label: source.label(),
            base_blocks,
            granularity,
        }
    }

    /// Advances the chain by `base_blocks + 1`; afterwards every recipient has
    /// exactly `split` pending.
    pub async fn distribute(
        &self,
        recipients: Vec<Address>,
    ) -> Result<FundingRound, ProvisionError> {
        if recipients.is_empty() {
            return Err(ConfigurationError::NoRecipients.into());
        }

        let source_address = self
            .chain
            .new_address()
            .await
            .map_err(ProvisionError::rpc("new_address", &self.label))?;
        self.chain
            .mine(self.base_blocks, &source_address)
            .await
            .map_err(ProvisionError::rpc("mine", &self.label))?;

        let balance = self
            .chain
            .balance()
            .await
            .map_err(ProvisionError::rpc("balance", &self.label))?;
        let split = compute_split(balance, recipients.len(), self.granularity)?;
        info!(
            %balance,
            %split,
            recipients = recipients.len(),
            "funding base mined, splitting balance"
        );

        for address in &recipients {
            let txid = self
                .chain
                .send(address, split)
                .await
                .map_err(ProvisionError::rpc("send", &self.label))?;
            debug!(%address, %txid, %split, "funding transfer broadcast");
        }

        self.chain
            .mine(1, &source_address)
            .await
            .map_err(ProvisionError::rpc("mine", &self.label))?;

        Ok(FundingRound {
            source_address,
            split,
            recipients,
        })
    }
}
