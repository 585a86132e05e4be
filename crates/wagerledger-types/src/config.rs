//! Configuration types for the ledger and the disclosure protocol.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{GameId, Result, WagerError, constants};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WagerConfig {
    pub ledger: LedgerConfig,
    pub disclosure: DisclosureConfig,
}

impl WagerConfig {
    /// Parse a JSON configuration document and validate it.
    /// Missing sections and fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| WagerError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.ledger.validate()?;
        self.disclosure.validate()
    }
}

/// Bet ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Games a new bet may target.
    pub active_games: Vec<GameId>,
    /// Lower bound (inclusive) of creation-time odds.
    pub odds_min: Decimal,
    /// Upper bound (exclusive) of creation-time odds.
    pub odds_max: Decimal,
    /// Storage key of the key index.
    pub index_key: String,
    /// Prefix for record storage keys.
    pub record_prefix: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            active_games: constants::DEFAULT_ACTIVE_GAMES
                .iter()
                .map(|g| GameId::new(*g))
                .collect(),
            odds_min: Decimal::new(constants::DEFAULT_ODDS_MIN_BPS, constants::ODDS_BPS_SCALE),
            odds_max: Decimal::new(constants::DEFAULT_ODDS_MAX_BPS, constants::ODDS_BPS_SCALE),
            index_key: constants::INDEX_KEY.to_string(),
            record_prefix: constants::RECORD_PREFIX.to_string(),
        }
    }
}

impl LedgerConfig {
    #[must_use]
    pub fn is_active_game(&self, game: &GameId) -> bool {
        self.active_games.iter().any(|g| g == game)
    }

    pub fn validate(&self) -> Result<()> {
        if self.active_games.is_empty() {
            return Err(WagerError::Configuration(
                "active_games must not be empty".into(),
            ));
        }
        if self.odds_min <= Decimal::ZERO || self.odds_min >= self.odds_max {
            return Err(WagerError::Configuration(format!(
                "odds range must satisfy 0 < min < max, got [{}, {})",
                self.odds_min, self.odds_max
            )));
        }
        if self.index_key.is_empty() || self.record_prefix.is_empty() {
            return Err(WagerError::Configuration(
                "index_key and record_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Disclosure protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisclosureConfig {
    /// Validity window of a session challenge, in days.
    pub duration_days: u32,
    /// Pause between a successful signature and decoding, in milliseconds.
    pub settle_delay_ms: u64,
    /// Random bytes behind the generated challenge public key.
    pub public_key_bytes: usize,
}

impl Default for DisclosureConfig {
    fn default() -> Self {
        Self {
            duration_days: constants::DEFAULT_CHALLENGE_DURATION_DAYS,
            settle_delay_ms: constants::DEFAULT_SETTLE_DELAY_MS,
            public_key_bytes: constants::DEFAULT_PUBLIC_KEY_BYTES,
        }
    }
}

impl DisclosureConfig {
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_days == 0 {
            return Err(WagerError::Configuration(
                "duration_days must be positive".into(),
            ));
        }
        if self.public_key_bytes == 0 {
            return Err(WagerError::Configuration(
                "public_key_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}
