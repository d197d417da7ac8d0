//! Recording fakes for unit tests of the provisioning components.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    DynError,
    nodes::{
        Address, Amount, ChainDriver, ChannelId, FundingPoint, LightningEndpoint, NodeUri,
        ShortChannelId, Txid,
    },
    topology::{ChannelOpenPolicy, ChannelPolicyUpdate},
};

#[derive(Default)]
struct FakeChainState {
    height: u64,
    reward: Amount,
    balance: Amount,
    mempool: Vec<Txid>,
    mine_calls: Vec<u64>,
    sends: Vec<(Address, Amount)>,
    next_tx: u64,
}

/// Chain without maturity or fees; mining confirms the whole mempool.
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<FakeChainState>,
}

impl FakeChain {
    pub fn with_reward(reward: Amount) -> Self {
        Self {
            state: Mutex::new(FakeChainState {
                reward,
                ..FakeChainState::default()
            }),
        }
    }

    pub fn broadcast(&self) -> Txid {
        let mut state = self.state.lock().unwrap();
        state.next_tx += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&state.next_tx.to_be_bytes());
        let txid = Txid::from_bytes(bytes);
        state.mempool.push(txid);
        txid
    }

    pub fn mine_calls(&self) -> Vec<u64> {
        self.state.lock().unwrap().mine_calls.clone()
    }

    pub fn sends(&self) -> Vec<(Address, Amount)> {
        self.state.lock().unwrap().sends.clone()
    }

    pub fn current_height(&self) -> u64 {
        self.state.lock().unwrap().height
    }
}

#[async_trait]
impl ChainDriver for FakeChain {
    async fn new_address(&self) -> Result<Address, DynError> {
        Ok(Address::new("fake-miner"))
    }

    async fn balance(&self) -> Result<Amount, DynError> {
        Ok(self.state.lock().unwrap().balance)
    }

    async fn send(&self, address: &Address, amount: Amount) -> Result<Txid, DynError> {
        self.state
            .lock()
            .unwrap()
            .sends
            .push((address.clone(), amount));
        Ok(self.broadcast())
    }

    async fn mine(&self, blocks: u64, _address: &Address) -> Result<(), DynError> {
        let mut state = self.state.lock().unwrap();
        state.mine_calls.push(blocks);
        state.height += blocks;
        let reward = state.reward.checked_mul(blocks).unwrap_or_default();
        state.balance = state.balance + reward;
        state.mempool.clear();
        Ok(())
    }

    async fn mempool(&self) -> Result<HashSet<Txid>, DynError> {
        Ok(self.state.lock().unwrap().mempool.iter().copied().collect())
    }

    async fn height(&self) -> Result<u64, DynError> {
        Ok(self.state.lock().unwrap().height)
    }
}

/// Payment endpoint that records every call it receives.
pub struct FakeLightning {
    index: usize,
    chain: Arc<FakeChain>,
    output_index: u32,
    calls: Mutex<Vec<String>>,
    view: Mutex<HashSet<ChannelId>>,
}

impl FakeLightning {
    pub fn new(index: usize, chain: Arc<FakeChain>) -> Self {
        Self {
            index,
            chain,
            output_index: 0,
            calls: Mutex::new(Vec::new()),
            view: Mutex::new(HashSet::new()),
        }
    }

    /// Funds channels on the given output instead of output 0.
    pub fn with_output_index(mut self, output_index: u32) -> Self {
        self.output_index = output_index;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of global channel view fetches so far.
    pub fn view_polls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| *call == "view")
            .count()
    }

    pub fn set_view_size(&self, channels: u64) {
        *self.view.lock().unwrap() = (1..=channels)
            .map(|height| ShortChannelId::new(height, 1, 0).unwrap())
            .collect();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LightningEndpoint for FakeLightning {
    async fn new_address(&self) -> Result<Address, DynError> {
        Ok(Address::new(format!("fake-ln-{}", self.index)))
    }

    async fn confirmed_balance(&self) -> Result<Amount, DynError> {
        Ok(Amount::ZERO)
    }

    async fn reachable_address(&self) -> Result<Option<NodeUri>, DynError> {
        Ok(Some(NodeUri::new(
            format!("pk{}", self.index),
            "127.0.0.1",
            9735,
        )))
    }

    async fn connect_peer(&self, peer: &NodeUri) -> Result<(), DynError> {
        self.record(format!("connect {}", peer.pubkey));
        Ok(())
    }

    async fn open_channel(
        &self,
        peer: &NodeUri,
        _policy: &ChannelOpenPolicy,
    ) -> Result<FundingPoint, DynError> {
        self.record(format!("open {} at height {}", peer.pubkey, self.chain.current_height()));
        Ok(FundingPoint::new(self.chain.broadcast(), self.output_index))
    }

    async fn update_channel_policy(
        &self,
        funding_point: &FundingPoint,
        _policy: &ChannelPolicyUpdate,
    ) -> Result<(), DynError> {
        self.record(format!("update {funding_point}"));
        Ok(())
    }

    async fn global_channel_view(&self) -> Result<HashSet<ChannelId>, DynError> {
        self.record("view".to_owned());
        Ok(self.view.lock().unwrap().clone())
    }
}
