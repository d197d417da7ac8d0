use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use ln_testing_framework_core::{
    nodes::{Address, Amount, FundingPoint, NodeIndex, NodeUri, ShortChannelId, Txid},
    topology::{ChannelOpenPolicy, ChannelPolicyUpdate},
};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use tokio::time::Instant;
use tracing::debug;

use crate::{SimError, SimParams};

pub type WalletId = usize;

const ENDPOINT_PORT: u16 = 9735;

/// A policy update as the network saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyUpdateRecord {
    pub node: NodeIndex,
    pub funding_point: FundingPoint,
    pub policy: ChannelPolicyUpdate,
    /// Channel-view size of every payment node, in deployment order, at the
    /// moment the update was issued.
    pub view_sizes: Vec<usize>,
}

#[derive(Default)]
struct Wallet {
    coinbase: Vec<(u64, Amount)>,
    confirmed: Amount,
    spent: Amount,
}

#[derive(Clone, Copy)]
enum OutputKind {
    Wallet(WalletId),
    Channel(usize),
}

struct TxOut {
    value: Amount,
    kind: OutputKind,
}

struct Transaction {
    txid: Txid,
    outputs: Vec<TxOut>,
}

struct Channel {
    funding_point: FundingPoint,
    parties: [NodeIndex; 2],
    short_channel_id: Option<ShortChannelId>,
    confirmed_at: Option<u64>,
    announced_at: Option<Instant>,
}

struct Endpoint {
    index: NodeIndex,
    pubkey: String,
    wallet: WalletId,
    ready_at: Instant,
    peers: HashSet<String>,
}

struct ChainState {
    params: SimParams,
    rng: StdRng,
    /// Txids per block; index 0 of each block is its coinbase.
    blocks: Vec<Vec<Txid>>,
    mempool: Vec<Transaction>,
    addresses: HashMap<Address, WalletId>,
    wallets: Vec<Wallet>,
    channels: Vec<Channel>,
    endpoints: Vec<Endpoint>,
    policy_journal: Vec<PolicyUpdateRecord>,
}

/// Shared regtest-like chain plus the gossip layer of its payment nodes.
///
/// Every handle locks the state for one operation and never across an await.
pub struct SimNetwork {
    state: Mutex<ChainState>,
}

impl SimNetwork {
    #[must_use]
    pub fn new(params: SimParams) -> Self {
        let rng = StdRng::seed_from_u64(params.seed);
        Self {
            state: Mutex::new(ChainState {
                params,
                rng,
                blocks: Vec::new(),
                mempool: Vec::new(),
                addresses: HashMap::new(),
                wallets: Vec::new(),
                channels: Vec::new(),
                endpoints: Vec::new(),
                policy_journal: Vec::new(),
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, ChainState>, SimError> {
        self.state.lock().map_err(|_| SimError::Poisoned)
    }

    pub fn height(&self) -> Result<u64, SimError> {
        Ok(self.state()?.height())
    }

    /// Txids of the block at `height`, coinbase first.
    pub fn block(&self, height: u64) -> Result<Option<Vec<Txid>>, SimError> {
        let state = self.state()?;
        let block = height
            .checked_sub(1)
            .and_then(|offset| state.blocks.get(offset as usize))
            .cloned();
        Ok(block)
    }

    pub fn policy_journal(&self) -> Result<Vec<PolicyUpdateRecord>, SimError> {
        Ok(self.state()?.policy_journal.clone())
    }

    /// Pubkeys `index` has a peer connection with.
    pub fn peers(&self, index: NodeIndex) -> Result<HashSet<String>, SimError> {
        let state = self.state()?;
        Ok(state.endpoint(index)?.peers.clone())
    }

    pub fn is_deployed(&self) -> Result<bool, SimError> {
        Ok(!self.state()?.wallets.is_empty())
    }

    pub(crate) fn add_wallet(&self) -> Result<WalletId, SimError> {
        let mut state = self.state()?;
        state.wallets.push(Wallet::default());
        Ok(state.wallets.len() - 1)
    }

    pub(crate) fn add_endpoint(&self, index: NodeIndex, wallet: WalletId) -> Result<(), SimError> {
        let mut state = self.state()?;
        let pubkey = format!("02{}", hex::encode(state.rng.r#gen::<[u8; 32]>()));
        let ready_at = Instant::now() + state.params.endpoint_ready_after;
        state.endpoints.push(Endpoint {
            index,
            pubkey,
            wallet,
            ready_at,
            peers: HashSet::new(),
        });
        Ok(())
    }

    pub(crate) fn new_address(&self, wallet: WalletId) -> Result<Address, SimError> {
        let mut state = self.state()?;
        let address = Address::new(format!(
            "bcrt1q{}",
            hex::encode(state.rng.r#gen::<[u8; 20]>())
        ));
        state.addresses.insert(address.clone(), wallet);
        Ok(address)
    }

    pub(crate) fn balance(&self, wallet: WalletId) -> Result<Amount, SimError> {
        Ok(self.state()?.spendable(wallet))
    }

    pub(crate) fn send(
        &self,
        wallet: WalletId,
        address: &Address,
        amount: Amount,
    ) -> Result<Txid, SimError> {
        let mut state = self.state()?;
        let destination = *state
            .addresses
            .get(address)
            .ok_or_else(|| SimError::UnknownAddress {
                address: address.clone(),
            })?;
        let requested = amount + state.params.fee;
        state.debit(wallet, requested)?;

        let txid = state.broadcast(vec![TxOut {
            value: amount,
            kind: OutputKind::Wallet(destination),
        }]);
        debug!(%txid, %address, %amount, "sim: transfer broadcast");
        Ok(txid)
    }

    pub(crate) fn mine(&self, blocks: u64, address: &Address) -> Result<(), SimError> {
        let mut state = self.state()?;
        let wallet = *state
            .addresses
            .get(address)
            .ok_or_else(|| SimError::UnknownAddress {
                address: address.clone(),
            })?;
        for _ in 0..blocks {
            state.mine_block(wallet)?;
        }
        debug!(blocks, height = state.height(), "sim: blocks mined");
        Ok(())
    }

    pub(crate) fn mempool(&self) -> Result<HashSet<Txid>, SimError> {
        Ok(self.state()?.mempool.iter().map(|tx| tx.txid).collect())
    }

    pub(crate) fn reachable_address(&self, index: NodeIndex) -> Result<Option<NodeUri>, SimError> {
        let state = self.state()?;
        let endpoint = state.endpoint(index)?;
        if Instant::now() < endpoint.ready_at {
            return Ok(None);
        }
        Ok(Some(NodeUri::new(
            endpoint.pubkey.clone(),
            format!("node-{index}"),
            ENDPOINT_PORT,
        )))
    }

    /// Connecting twice to the same peer is a no-op.
    pub(crate) fn connect(&self, index: NodeIndex, peer: &NodeUri) -> Result<(), SimError> {
        let mut state = self.state()?;
        let peer_index = state.endpoint_by_pubkey(&peer.pubkey)?.index;
        state.link(index, peer_index)
    }

    /// Funds a channel from the opener's entire spendable balance. Funding and
    /// change outputs are ordered by ascending value, so the funding output
    /// lands on index 0 only while the change is at least the capacity.
    pub(crate) fn open_channel(
        &self,
        index: NodeIndex,
        peer: &NodeUri,
        policy: &ChannelOpenPolicy,
    ) -> Result<FundingPoint, SimError> {
        let mut state = self.state()?;
        let peer_index = state.endpoint_by_pubkey(&peer.pubkey)?.index;
        if peer_index == index {
            return Err(SimError::SelfChannel { index });
        }
        let capacity = policy.local_amt;
        let push = policy.push_amt.unwrap_or_default();
        if push > capacity {
            return Err(SimError::PushExceedsCapacity { push, capacity });
        }

        let wallet = state.endpoint(index)?.wallet;
        let inputs = state.spendable(wallet);
        let requested = capacity + state.params.fee;
        let change = inputs
            .checked_sub(requested)
            .ok_or(SimError::InsufficientFunds {
                available: inputs,
                requested,
            })?;
        state.debit(wallet, inputs)?;
        state.link(index, peer_index)?;

        let channel = state.channels.len();
        let mut outputs = vec![TxOut {
            value: capacity,
            kind: OutputKind::Channel(channel),
        }];
        if change > Amount::ZERO {
            outputs.push(TxOut {
                value: change,
                kind: OutputKind::Wallet(wallet),
            });
        }
        outputs.sort_by_key(|output| output.value);
        // funding plus optional change: the funding output is second only when
        // the change sorts ahead of it
        let output_index = u32::from(matches!(outputs[0].kind, OutputKind::Wallet(_)));

        let txid = state.broadcast(outputs);
        let funding_point = FundingPoint::new(txid, output_index);
        state.channels.push(Channel {
            funding_point,
            parties: [index, peer_index],
            short_channel_id: None,
            confirmed_at: None,
            announced_at: None,
        });
        debug!(%funding_point, %capacity, %change, "sim: channel funding broadcast");
        Ok(funding_point)
    }

    pub(crate) fn update_channel_policy(
        &self,
        index: NodeIndex,
        funding_point: &FundingPoint,
        policy: &ChannelPolicyUpdate,
    ) -> Result<(), SimError> {
        let mut state = self.state()?;
        let channel = state
            .channels
            .iter()
            .find(|channel| channel.funding_point == *funding_point)
            .ok_or(SimError::UnknownChannel {
                funding_point: *funding_point,
            })?;
        if !channel.parties.contains(&index) {
            return Err(SimError::NotChannelParty {
                index,
                funding_point: *funding_point,
            });
        }
        if channel.short_channel_id.is_none() {
            return Err(SimError::UnconfirmedChannel {
                funding_point: *funding_point,
            });
        }

        let view_sizes = state
            .endpoints
            .iter()
            .map(|endpoint| state.channel_view(endpoint.index).len())
            .collect();
        state.policy_journal.push(PolicyUpdateRecord {
            node: index,
            funding_point: *funding_point,
            policy: policy.clone(),
            view_sizes,
        });
        Ok(())
    }

    pub fn channel_view(&self, index: NodeIndex) -> Result<HashSet<ShortChannelId>, SimError> {
        Ok(self.state()?.channel_view(index))
    }

    pub(crate) fn endpoint_wallet(&self, index: NodeIndex) -> Result<WalletId, SimError> {
        Ok(self.state()?.endpoint(index)?.wallet)
    }
}

impl ChainState {
    fn height(&self) -> u64 {
        self.blocks.len() as u64
    }

    fn spendable(&self, wallet: WalletId) -> Amount {
        let Some(wallet) = self.wallets.get(wallet) else {
            return Amount::ZERO;
        };
        let tip = self.height();
        let mature: Amount = wallet
            .coinbase
            .iter()
            .filter(|(height, _)| tip + 1 - height >= self.params.coinbase_maturity)
            .map(|(_, reward)| *reward)
            .sum();
        mature + wallet.confirmed - wallet.spent
    }

    fn debit(&mut self, wallet: WalletId, requested: Amount) -> Result<(), SimError> {
        let available = self.spendable(wallet);
        if available < requested {
            return Err(SimError::InsufficientFunds {
                available,
                requested,
            });
        }
        if let Some(wallet) = self.wallets.get_mut(wallet) {
            wallet.spent = wallet.spent + requested;
        }
        Ok(())
    }

    fn next_txid(&mut self) -> Txid {
        Txid::from_bytes(self.rng.r#gen())
    }

    fn broadcast(&mut self, outputs: Vec<TxOut>) -> Txid {
        let txid = self.next_txid();
        self.mempool.push(Transaction { txid, outputs });
        txid
    }

    /// Appends one block: the coinbase, then the whole mempool in arrival order.
    fn mine_block(&mut self, miner: WalletId) -> Result<(), SimError> {
        let height = self.height() + 1;
        // the last mempool entry takes the highest tx index of the block
        ShortChannelId::new(height, self.mempool.len() as u64, 0)?;
        let reward = self.params.block_reward;
        if let Some(wallet) = self.wallets.get_mut(miner) {
            wallet.coinbase.push((height, reward));
        }

        let mut block = vec![self.next_txid()];
        for (position, tx) in std::mem::take(&mut self.mempool).into_iter().enumerate() {
            let tx_index = position as u64 + 1;
            for (output_index, output) in tx.outputs.iter().enumerate() {
                match output.kind {
                    OutputKind::Wallet(wallet) => {
                        if let Some(wallet) = self.wallets.get_mut(wallet) {
                            wallet.confirmed = wallet.confirmed + output.value;
                        }
                    }
                    OutputKind::Channel(channel) => {
                        if let Some(channel) = self.channels.get_mut(channel) {
                            channel.confirmed_at = Some(height);
                            channel.short_channel_id = Some(ShortChannelId::new(
                                height,
                                tx_index,
                                output_index as u64,
                            )?);
                        }
                    }
                }
            }
            block.push(tx.txid);
        }
        self.blocks.push(block);
        self.announce_buried_channels();
        Ok(())
    }

    fn announce_buried_channels(&mut self) {
        let tip = self.height();
        let depth = self.params.gossip_depth;
        let now = Instant::now();
        for channel in &mut self.channels {
            let buried = channel
                .confirmed_at
                .is_some_and(|height| tip + 1 - height >= depth);
            if buried && channel.announced_at.is_none() {
                channel.announced_at = Some(now);
            }
        }
    }

    /// Channels `index` knows about: its own once announced, the rest after
    /// the gossip delay.
    fn channel_view(&self, index: NodeIndex) -> HashSet<ShortChannelId> {
        let now = Instant::now();
        self.channels
            .iter()
            .filter_map(|channel| {
                let announced_at = channel.announced_at?;
                let short_channel_id = channel.short_channel_id?;
                let visible = channel.parties.contains(&index)
                    || now >= announced_at + self.params.gossip_delay;
                visible.then_some(short_channel_id)
            })
            .collect()
    }

    fn endpoint(&self, index: NodeIndex) -> Result<&Endpoint, SimError> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.index == index)
            .ok_or(SimError::NoEndpoint { index })
    }

    fn endpoint_by_pubkey(&self, pubkey: &str) -> Result<&Endpoint, SimError> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.pubkey == pubkey)
            .ok_or_else(|| SimError::UnknownPeer {
                pubkey: pubkey.to_owned(),
            })
    }

    fn link(&mut self, a: NodeIndex, b: NodeIndex) -> Result<(), SimError> {
        let a_key = self.endpoint(a)?.pubkey.clone();
        let b_key = self.endpoint(b)?.pubkey.clone();
        for endpoint in &mut self.endpoints {
            if endpoint.index == a {
                endpoint.peers.insert(b_key.clone());
            } else if endpoint.index == b {
                endpoint.peers.insert(a_key.clone());
            }
        }
        Ok(())
    }
}
