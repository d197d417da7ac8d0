use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use clap::{Parser, error::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nodes::Amount;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {policy} '{flags}': {reason}")]
pub struct PolicyParseError {
    pub policy: &'static str,
    pub flags: String,
    pub kind: ErrorKind,
    pub reason: String,
}

impl PolicyParseError {
    fn from_clap(policy: &'static str, flags: &str, err: &clap::Error) -> Self {
        let rendered = err.to_string();
        let reason = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_owned();
        Self {
            policy,
            flags: flags.to_owned(),
            kind: err.kind(),
            reason,
        }
    }
}

/// Parses a `--name=value` flag string into the clap argument struct `A`.
fn parse_flags<A: Parser>(policy: &'static str, s: &str) -> Result<A, PolicyParseError> {
    A::try_parse_from(s.split_whitespace())
        .map_err(|err| PolicyParseError::from_clap(policy, s, &err))
}

#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct OpenFlags {
    #[arg(long = "local_amt")]
    local_amt: u64,
    #[arg(long = "push_amt")]
    push_amt: Option<u64>,
}

#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct UpdateFlags {
    #[arg(long = "base_fee_msat")]
    base_fee_msat: u64,
    #[arg(long = "fee_rate_ppm")]
    fee_rate_ppm: u64,
    #[arg(long = "time_lock_delta")]
    time_lock_delta: u32,
    #[arg(long = "min_htlc_msat")]
    min_htlc_msat: Option<u64>,
    #[arg(long = "max_htlc_msat")]
    max_htlc_msat: Option<u64>,
}

/// Channel-open parameters attached to an edge's source (`source-policy`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelOpenPolicy {
    /// Channel capacity funded by the opener.
    pub local_amt: Amount,
    /// Amount pushed to the remote side on open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_amt: Option<Amount>,
}

impl ChannelOpenPolicy {
    #[must_use]
    pub const fn new(local_amt: Amount) -> Self {
        Self {
            local_amt,
            push_amt: None,
        }
    }

    #[must_use]
    pub const fn with_push(mut self, push_amt: Amount) -> Self {
        self.push_amt = Some(push_amt);
        self
    }
}

/// Routing terms advertised at an edge's destination (`target-policy`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelPolicyUpdate {
    pub base_fee_msat: u64,
    pub fee_rate_ppm: u64,
    pub time_lock_delta: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_htlc_msat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_htlc_msat: Option<u64>,
}

impl FromStr for ChannelOpenPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flags: OpenFlags = parse_flags("source-policy", s)?;
        Ok(Self {
            local_amt: Amount::from_sat(flags.local_amt),
            push_amt: flags.push_amt.map(Amount::from_sat),
        })
    }
}

impl Display for ChannelOpenPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "--local_amt={}", self.local_amt.to_sat())?;
        if let Some(push) = self.push_amt {
            write!(f, " --push_amt={}", push.to_sat())?;
        }
        Ok(())
    }
}

impl FromStr for ChannelPolicyUpdate {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flags: UpdateFlags = parse_flags("target-policy", s)?;
        Ok(Self {
            base_fee_msat: flags.base_fee_msat,
            fee_rate_ppm: flags.fee_rate_ppm,
            time_lock_delta: flags.time_lock_delta,
            min_htlc_msat: flags.min_htlc_msat,
            max_htlc_msat: flags.max_htlc_msat,
        })
    }
}

impl Display for ChannelPolicyUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--base_fee_msat={} --fee_rate_ppm={} --time_lock_delta={}",
            self.base_fee_msat, self.fee_rate_ppm, self.time_lock_delta
        )?;
        if let Some(min) = self.min_htlc_msat {
            write!(f, " --min_htlc_msat={min}")?;
        }
        if let Some(max) = self.max_htlc_msat {
            write!(f, " --max_htlc_msat={max}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_policy_accepts_both_flag_forms() {
        let policy: ChannelOpenPolicy = "--local_amt=100000 --push_amt 5000".parse().unwrap();
        assert_eq!(policy.local_amt, Amount::from_sat(100_000));
        assert_eq!(policy.push_amt, Some(Amount::from_sat(5_000)));
        assert_eq!(policy.to_string(), "--local_amt=100000 --push_amt=5000");
    }

    #[test]
    fn open_policy_requires_capacity() {
        let err = "--push_amt=10".parse::<ChannelOpenPolicy>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequiredArgument);
        assert_eq!(err.policy, "source-policy");
    }

    #[test]
    fn repeated_capacity_flag_is_rejected() {
        let err = "--local_amt=100000 --local_amt=1"
            .parse::<ChannelOpenPolicy>()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArgumentConflict);
        assert!(err.reason.contains("local_amt"), "{err}");
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let err = "--local_amt=lots".parse::<ChannelOpenPolicy>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueValidation);
    }

    #[test]
    fn update_policy_rejects_unknown_flags() {
        let err = "--base_fee_msat=1 --fee_rate_ppm=2 --time_lock_delta=40 --color=red"
            .parse::<ChannelPolicyUpdate>()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownArgument);
        assert!(err.reason.contains("--color"), "{err}");
    }

    #[test]
    fn update_policy_parses_optional_htlc_limits() {
        let policy: ChannelPolicyUpdate =
            "--base_fee_msat=1000 --fee_rate_ppm=200 --time_lock_delta=40 --min_htlc_msat=1"
                .parse()
                .unwrap();
        assert_eq!(policy.min_htlc_msat, Some(1));
        assert_eq!(policy.max_htlc_msat, None);
        assert_eq!(policy.time_lock_delta, 40);
    }

    #[test]
    fn bare_values_are_rejected() {
        let err = "100000".parse::<ChannelOpenPolicy>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownArgument);
    }
}
