use std::{
    fmt::{self, Display, Formatter},
    iter::Sum,
    ops::{Add, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::constants::COIN;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid txid '{value}': expected 64 hex characters")]
    Txid { value: String },
    #[error("invalid funding point '{value}': expected <txid>:<output index>")]
    FundingPoint { value: String },
    #[error("invalid node uri '{value}': expected <pubkey>@<host>:<port>")]
    NodeUri { value: String },
    #[error("invalid short channel id '{value}': expected <height>x<tx>x<output>")]
    ShortChannelId { value: String },
    #[error("short channel id {field} {value} exceeds {max}")]
    ShortChannelIdRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

/// On-chain amount in base units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_sat(sats: u64) -> Self {
        Self(sats)
    }

    #[must_use]
    pub const fn from_coins(coins: u64) -> Self {
        Self(coins * COIN)
    }

    #[must_use]
    pub const fn to_sat(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    #[must_use]
    pub const fn checked_mul(self, rhs: u64) -> Option<Self> {
        match self.0.checked_mul(rhs) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, amount| acc + amount)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08}", self.0 / COIN, self.0 % COIN)
    }
}

/// Opaque on-chain address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Txid([u8; 32]);

impl Txid {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for Txid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({self})")
    }
}

impl FromStr for Txid {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseError::Txid {
            value: s.to_owned(),
        })?;
        Ok(Self(bytes))
    }
}

/// Outpoint of a channel funding output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct FundingPoint {
    pub txid: Txid,
    pub output_index: u32,
}

impl FundingPoint {
    #[must_use]
    pub const fn new(txid: Txid, output_index: u32) -> Self {
        Self { txid, output_index }
    }
}

impl Display for FundingPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.output_index)
    }
}

impl FromStr for FundingPoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::FundingPoint {
            value: s.to_owned(),
        };
        let (txid, index) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            txid: txid.parse().map_err(|_| invalid())?,
            output_index: index.parse().map_err(|_| invalid())?,
        })
    }
}

/// Connectable payment-layer address, `<pubkey>@<host>:<port>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct NodeUri {
    pub pubkey: String,
    pub host: String,
    pub port: u16,
}

impl NodeUri {
    #[must_use]
    pub fn new(pubkey: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            pubkey: pubkey.into(),
            host: host.into(),
            port,
        }
    }
}

impl Display for NodeUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.pubkey, self.host, self.port)
    }
}

impl FromStr for NodeUri {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::NodeUri {
            value: s.to_owned(),
        };
        let (pubkey, addr) = s.split_once('@').ok_or_else(invalid)?;
        let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
        if pubkey.is_empty() || host.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            pubkey: pubkey.to_owned(),
            host: host.to_owned(),
            port: port.parse().map_err(|_| invalid())?,
        })
    }
}

/// Block position of a channel's funding output.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct ShortChannelId(u64);

/// Channels are identified in a node's graph view by their short channel id.
pub type ChannelId = ShortChannelId;

const MAX_BLOCK_POSITION: u64 = 0xff_ffff;

fn scid_field(field: &'static str, value: u64, max: u64) -> Result<u64, ParseError> {
    if value > max {
        return Err(ParseError::ShortChannelIdRange { field, value, max });
    }
    Ok(value)
}

impl ShortChannelId {
    /// Packs a block position. Height and tx index get 24 bits each, the
    /// output index 16.
    pub fn new(block_height: u64, tx_index: u64, output_index: u64) -> Result<Self, ParseError> {
        let height = scid_field("block height", block_height, MAX_BLOCK_POSITION)?;
        let tx = scid_field("tx index", tx_index, MAX_BLOCK_POSITION)?;
        let output = scid_field("output index", output_index, u64::from(u16::MAX))?;
        Ok(Self((height << 40) | (tx << 16) | output))
    }

    #[must_use]
    pub const fn block_height(self) -> u32 {
        (self.0 >> 40) as u32
    }

    #[must_use]
    pub const fn tx_index(self) -> u32 {
        ((self.0 >> 16) & 0xff_ffff) as u32
    }

    #[must_use]
    pub const fn output_index(self) -> u16 {
        (self.0 & 0xffff) as u16
    }
}

impl From<u64> for ShortChannelId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ShortChannelId> for u64 {
    fn from(scid: ShortChannelId) -> Self {
        scid.0
    }
}

impl Display for ShortChannelId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}",
            self.block_height(),
            self.tx_index(),
            self.output_index()
        )
    }
}

impl FromStr for ShortChannelId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::ShortChannelId {
            value: s.to_owned(),
        };
        let mut parts = s.split('x');
        let (Some(height), Some(tx), Some(output), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        Self::new(
            height.parse().map_err(|_| invalid())?,
            tx.parse().map_err(|_| invalid())?,
            output.parse().map_err(|_| invalid())?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXID: &str = "3b1f0c9e5a7d2e4f6a8b0c1d2e3f405162738495a6b7c8d9e0f1a2b3c4d5e6f7";

    #[test]
    fn funding_point_keeps_lncli_form() {
        let point: FundingPoint = format!("{TXID}:0").parse().unwrap();
        assert_eq!(point.output_index, 0);
        assert_eq!(point.to_string(), format!("{TXID}:0"));
        assert!(point.to_string().ends_with(":0"));
    }

    #[test]
    fn funding_point_rejects_missing_index() {
        let err = TXID.parse::<FundingPoint>().unwrap_err();
        assert!(matches!(err, ParseError::FundingPoint { .. }));
    }

    #[test]
    fn txid_rejects_short_hex() {
        assert!("abcd".parse::<Txid>().is_err());
    }

    #[test]
    fn node_uri_splits_pubkey_and_port() {
        let uri: NodeUri = "02aa@ln-1.local:9735".parse().unwrap();
        assert_eq!(uri.pubkey, "02aa");
        assert_eq!(uri.host, "ln-1.local");
        assert_eq!(uri.port, 9735);
        assert!("ln-1.local:9735".parse::<NodeUri>().is_err());
    }

    #[test]
    fn short_channel_id_packs_block_position() {
        let scid = ShortChannelId::new(300, 1, 0).unwrap();
        assert_eq!(u64::from(scid), (300u64 << 40) | (1 << 16));
        assert_eq!(scid.to_string(), "300x1x0");
        assert_eq!("300x1x0".parse::<ShortChannelId>().unwrap(), scid);
    }

    #[test]
    fn short_channel_id_rejects_positions_past_24_bits() {
        let top = ShortChannelId::new(0xff_ffff, 0xff_ffff, 0xffff).unwrap();
        assert_eq!(top.block_height(), 0xff_ffff);
        assert_eq!(top.tx_index(), 0xff_ffff);
        assert_eq!(top.output_index(), 0xffff);

        let err = ShortChannelId::new(1 << 24, 1, 0).unwrap_err();
        assert_eq!(
            err,
            ParseError::ShortChannelIdRange {
                field: "block height",
                value: 1 << 24,
                max: 0xff_ffff,
            }
        );
        assert!(ShortChannelId::new(1, 1 << 24, 0).is_err());
        assert!(ShortChannelId::new(1, 1, 1 << 16).is_err());
        assert!("16777216x1x0".parse::<ShortChannelId>().is_err());
    }

    #[test]
    fn amount_displays_in_coins() {
        assert_eq!(Amount::from_coins(150).to_string(), "150.00000000");
        assert_eq!(Amount::from_sat(1).to_string(), "0.00000001");
    }
}
