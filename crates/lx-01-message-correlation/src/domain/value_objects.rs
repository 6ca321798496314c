//! Value objects for message correlation
//!
//! Ledger identifiers, consensus timestamps and message discriminators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{EntityIdError, TimestampError};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Ledger entity identifier in `shard.realm.num` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    /// Accepts `0.0.1234` and the checksummed form `0.0.1234-abcde`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EntityIdError::Empty);
        }

        let body = match trimmed.split_once('-') {
            Some((body, checksum)) => {
                if checksum.len() != 5 || !checksum.chars().all(|c| c.is_ascii_lowercase()) {
                    return Err(EntityIdError::InvalidChecksum(checksum.to_string()));
                }
                body
            }
            None => trimmed,
        };

        let parts: Vec<&str> = body.split('.').collect();
        if parts.len() != 3 {
            return Err(EntityIdError::WrongComponentCount(parts.len()));
        }

        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| EntityIdError::InvalidComponent(part.to_string()))
        };

        Ok(Self {
            shard: parse(parts[0])?,
            realm: parse(parts[1])?,
            num: parse(parts[2])?,
        })
    }
}

macro_rules! entity_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(EntityId);

        impl $name {
            pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
                Self(EntityId::new(shard, realm, num))
            }

            pub fn entity(&self) -> EntityId {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = EntityIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = EntityIdError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

entity_newtype!(
    /// Consensus service topic identifier
    TopicId
);

entity_newtype!(
    /// Ledger account identifier
    AccountId
);

/// Ledger network selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
    Previewnet,
    /// In-process topic, no ledger connection
    Local,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Previewnet => "previewnet",
            Network::Local => "local",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            "previewnet" => Ok(Network::Previewnet),
            "local" | "localnet" => Ok(Network::Local),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

/// Ledger-assigned consensus timestamp.
///
/// Ordered by (seconds, nanos). Text form is `<seconds>.<nanos:09>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConsensusTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl ConsensusTimestamp {
    pub fn new(seconds: i64, nanos: u32) -> Result<Self, TimestampError> {
        if nanos >= NANOS_PER_SECOND {
            return Err(TimestampError::NanosOutOfRange(nanos));
        }
        Ok(Self { seconds, nanos })
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos().min(NANOS_PER_SECOND - 1),
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }

    /// The smallest timestamp strictly after this one.
    pub fn next(&self) -> Self {
        if self.nanos + 1 == NANOS_PER_SECOND {
            Self {
                seconds: self.seconds.saturating_add(1),
                nanos: 0,
            }
        } else {
            Self {
                seconds: self.seconds,
                nanos: self.nanos + 1,
            }
        }
    }
}

impl fmt::Display for ConsensusTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

impl FromStr for ConsensusTimestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (secs, frac) = s.split_once('.').unwrap_or((s, ""));

        let seconds = secs
            .parse::<i64>()
            .map_err(|_| TimestampError::Malformed(s.to_string()))?;

        if frac.len() > 9 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(TimestampError::Malformed(s.to_string()));
        }
        let nanos = if frac.is_empty() {
            0
        } else {
            // Right-pad to nine digits: ".5" is half a second
            format!("{:0<9}", frac)
                .parse::<u32>()
                .map_err(|_| TimestampError::Malformed(s.to_string()))?
        };

        Self::new(seconds, nanos)
    }
}

impl TryFrom<String> for ConsensusTimestamp {
    type Error = TimestampError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ConsensusTimestamp> for String {
    fn from(ts: ConsensusTimestamp) -> Self {
        ts.to_string()
    }
}

/// Message discriminator carried in the `type` field.
///
/// Unrecognised values are preserved verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    RebalanceRequest,
    RebalanceRecommendation,
    RebalanceExecution,
    Other(String),
}

impl MessageKind {
    pub const REQUEST: &'static str = "REBALANCE_REQUEST";
    pub const RECOMMENDATION: &'static str = "REBALANCE_RECOMMENDATION";
    pub const EXECUTION: &'static str = "REBALANCE_EXECUTION";

    pub fn parse(raw: &str) -> Self {
        match raw {
            Self::REQUEST => MessageKind::RebalanceRequest,
            Self::RECOMMENDATION => MessageKind::RebalanceRecommendation,
            Self::EXECUTION => MessageKind::RebalanceExecution,
            other => MessageKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::RebalanceRequest => Self::REQUEST,
            MessageKind::RebalanceRecommendation => Self::RECOMMENDATION,
            MessageKind::RebalanceExecution => Self::EXECUTION,
            MessageKind::Other(raw) => raw,
        }
    }

    /// True for the three kinds that take part in correlation.
    pub fn is_rebalance(&self) -> bool {
        !matches!(self, MessageKind::Other(_))
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MessageKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        kind.as_str().to_string()
    }
}
