use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use ln_testing_framework_core::{
    DynError,
    nodes::{Address, Amount, ChainDriver, Txid},
};

use crate::network::{SimNetwork, WalletId};

/// On-chain wallet of one simulated node.
pub struct SimChainDriver {
    network: Arc<SimNetwork>,
    wallet: WalletId,
}

impl SimChainDriver {
    pub(crate) const fn new(network: Arc<SimNetwork>, wallet: WalletId) -> Self {
        Self { network, wallet }
    }
}

#[async_trait]
impl ChainDriver for SimChainDriver {
    async fn new_address(&self) -> Result<Address, DynError> {
        Ok(self.network.new_address(self.wallet)?)
    }

    async fn balance(&self) -> Result<Amount, DynError> {
        Ok(self.network.balance(self.wallet)?)
    }

    async fn send(&self, address: &Address, amount: Amount) -> Result<Txid, DynError> {
        Ok(self.network.send(self.wallet, address, amount)?)
    }

    async fn mine(&self, blocks: u64, address: &Address) -> Result<(), DynError> {
        Ok(self.network.mine(blocks, address)?)
    }

    async fn mempool(&self) -> Result<HashSet<Txid>, DynError> {
        Ok(self.network.mempool()?)
    }

    async fn height(&self) -> Result<u64, DynError> {
        Ok(self.network.height()?)
    }
}
