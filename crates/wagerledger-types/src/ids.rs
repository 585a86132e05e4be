//! Identifiers used throughout the WagerLedger.
//!
//! Bet keys are opaque strings so that keys written by older clients stay
//! readable; new keys use UUIDv7 for time-ordered uniqueness.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::WagerError;

// ---------------------------------------------------------------------------
// BetKey
// ---------------------------------------------------------------------------

/// Opaque, globally unique bet identifier. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BetKey(String);

impl BetKey {
    /// Generate a fresh key (UUIDv7, so keys sort by creation time).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// The key as stored in the index.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key of the record: `prefix || key`.
    #[must_use]
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }

    /// Recover a bet key from a storage key, if it carries `prefix`.
    #[must_use]
    pub fn from_storage_key(storage_key: &str, prefix: &str) -> Option<Self> {
        storage_key
            .strip_prefix(prefix)
            .filter(|rest| !rest.is_empty())
            .map(|rest| Self(rest.to_string()))
    }
}

impl From<&str> for BetKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BetKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// BettorAddress
// ---------------------------------------------------------------------------

/// 20-byte wallet address of a bettor.
///
/// Parsing accepts any hex casing, so two addresses that differ only in
/// checksum casing compare equal. Always rendered as lowercase `0x`-hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BettorAddress([u8; 20]);

impl BettorAddress {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// First four bytes as hex, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl FromStr for BettorAddress {
    type Err = WagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| WagerError::InvalidBet {
            reason: format!("invalid bettor address {s:?}: {e}"),
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for BettorAddress {
    type Error = WagerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BettorAddress> for String {
    fn from(addr: BettorAddress) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for BettorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Deterministic addresses for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl BettorAddress {
    /// Address whose 20 bytes are all `fill`.
    #[must_use]
    pub fn dummy(fill: u8) -> Self {
        Self([fill; 20])
    }
}

// ---------------------------------------------------------------------------
// GameId
// ---------------------------------------------------------------------------

/// Short identifier of a live game (e.g., "LOL").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
