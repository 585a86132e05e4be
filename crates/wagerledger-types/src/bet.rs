//! # BetRecord: the unit of the wager ledger
//!
//! ## State Machine
//!
//! ```text
//!                 settle(won)    ┌─────┐
//!            ┌──────────────────▶│ WON │
//!            │                   └─────┘
//!   ┌────────┴┐  settle(lost)    ┌──────┐
//!   │ PENDING ├─────────────────▶│ LOST │
//!   └────────┬┘                  └──────┘
//!            │   cancel          ┌──────────┐
//!            └──────────────────▶│ CANCELED │
//!                                └──────────┘
//! ```
//!
//! All three targets are terminal. The obscured amount is replaced only on
//! PENDING → WON, and odds never change after creation.
//!
//! ## Wire format
//!
//! Records are stored as JSON objects with the fields
//! `amount, timestamp, better, gameId, prediction, odds, status` plus a
//! `version` counter used for optimistic concurrency. Records written
//! without `odds` or `status` (or with `null`, zero odds, or an empty
//! status) read back as 1.5 and `pending`.

use std::fmt;

use rust_decimal::Decimal;
use serde::de::{Deserializer, IntoDeserializer};
use serde::{Deserialize, Serialize};

use crate::{BetKey, BettorAddress, GameId, ObscuredToken, Result, WagerError, constants};

/// Lifecycle status of a bet.
///
/// Transitions are **monotonic**: only `Pending` may move, and only to one
/// of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    #[default]
    Pending,
    Won,
    Lost,
    Canceled,
}

impl BetStatus {
    /// Can a bet in this status move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Won | Self::Lost | Self::Canceled)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Won => write!(f, "won"),
            Self::Lost => write!(f, "lost"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

/// Outcome an operator assigns when settling a bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// The terminal status this outcome settles into.
    #[must_use]
    pub fn status(self) -> BetStatus {
        match self {
            Self::Won => BetStatus::Won,
            Self::Lost => BetStatus::Lost,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.status().fmt(f)
    }
}

fn legacy_odds() -> Decimal {
    Decimal::new(constants::LEGACY_ODDS_BPS, constants::ODDS_BPS_SCALE)
}

/// `null` or zero odds read as the legacy default.
fn odds_or_legacy<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Decimal, D::Error> {
    let odds: Option<Decimal> = rust_decimal::serde::float_option::deserialize(d)?;
    Ok(odds.filter(|o| !o.is_zero()).unwrap_or_else(legacy_odds))
}

/// `null` or empty status reads as pending.
fn status_or_pending<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<BetStatus, D::Error> {
    match Option::<String>::deserialize(d)?.as_deref() {
        None | Some("") => Ok(BetStatus::Pending),
        Some(s) => BetStatus::deserialize(s.into_deserializer()),
    }
}

/// A single stored bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    /// Obscured stake (or payout, once won).
    pub amount: ObscuredToken,
    /// Creation time, seconds since the UNIX epoch.
    pub timestamp: u64,
    /// The wallet that placed the bet.
    #[serde(rename = "better")]
    pub bettor: BettorAddress,
    #[serde(rename = "gameId")]
    pub game_id: GameId,
    pub prediction: String,
    /// Fixed at creation.
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "odds_or_legacy",
        default = "legacy_odds"
    )]
    pub odds: Decimal,
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: BetStatus,
    /// Bumped on every replacement of the stored record.
    #[serde(default)]
    pub version: u64,
}

impl BetRecord {
    /// Case-insensitive ownership check against a wallet address.
    #[must_use]
    pub fn is_owned_by(&self, requester: &BettorAddress) -> bool {
        self.bettor == *requester
    }

    fn transition(&mut self, target: BetStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(WagerError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }

    /// PENDING → WON, replacing the amount with the payout token.
    pub fn mark_won(&mut self, payout: ObscuredToken) -> Result<()> {
        self.transition(BetStatus::Won)?;
        self.amount = payout;
        Ok(())
    }

    /// PENDING → LOST. The amount is left untouched.
    pub fn mark_lost(&mut self) -> Result<()> {
        self.transition(BetStatus::Lost)
    }

    /// PENDING → CANCELED. The amount is left untouched.
    pub fn mark_canceled(&mut self) -> Result<()> {
        self.transition(BetStatus::Canceled)
    }
}

/// Dummy record for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl BetRecord {
    pub fn dummy(bettor: BettorAddress, amount: ObscuredToken, timestamp: u64) -> Self {
        Self {
            amount,
            timestamp,
            bettor,
            game_id: GameId::new("LOL"),
            prediction: "Team A wins".to_string(),
            odds: Decimal::new(175, 2),
            status: BetStatus::Pending,
            version: 0,
        }
    }
}

/// A record together with the key it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Bet {
    pub key: BetKey,
    pub record: BetRecord,
}

/// Per-status counts over a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BetStats {
    pub pending: usize,
    pub won: usize,
    pub lost: usize,
    pub canceled: usize,
}

impl BetStats {
    #[must_use]
    pub fn from_bets(bets: &[Bet]) -> Self {
        bets.iter().fold(Self::default(), |mut stats, bet| {
            match bet.record.status {
                BetStatus::Pending => stats.pending += 1,
                BetStatus::Won => stats.won += 1,
                BetStatus::Lost => stats.lost += 1,
                BetStatus::Canceled => stats.canceled += 1,
            }
            stats
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.pending + self.won + self.lost + self.canceled
    }
}

/// Ledger query: a case-insensitive search term over game and prediction,
/// optionally narrowed to one status. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetFilter {
    pub search: Option<String>,
    pub status: Option<BetStatus>,
}

impl BetFilter {
    #[must_use]
    pub fn matches(&self, record: &BetRecord) -> bool {
        if self.status.is_some_and(|status| status != record.status) {
            return false;
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(term) if !term.is_empty() => {
                record.game_id.as_str().to_lowercase().contains(&term)
                    || record.prediction.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> BetRecord {
        BetRecord::dummy(
            BettorAddress::dummy(1),
            ObscuredToken::from_raw("FHE-MQ=="),
            1_700_000_000,
        )
    }

    #[test]
    fn transitions_valid() {
        assert!(BetStatus::Pending.can_transition_to(BetStatus::Won));
        assert!(BetStatus::Pending.can_transition_to(BetStatus::Lost));
        assert!(BetStatus::Pending.can_transition_to(BetStatus::Canceled));
    }

    #[test]
    fn transitions_out_of_terminal_invalid() {
        for from in [BetStatus::Won, BetStatus::Lost, BetStatus::Canceled] {
            for to in [
                BetStatus::Pending,
                BetStatus::Won,
                BetStatus::Lost,
                BetStatus::Canceled,
            ] {
                assert!(!from.can_transition_to(to), "{from} -> {to} must fail");
            }
        }
        assert!(!BetStatus::Pending.can_transition_to(BetStatus::Pending));
    }

    #[test]
    fn mark_won_replaces_amount() {
        let mut record = make_record();
        record.mark_won(ObscuredToken::from_raw("FHE-Mg==")).unwrap();
        assert_eq!(record.status, BetStatus::Won);
        assert_eq!(record.amount.as_str(), "FHE-Mg==");
    }

    #[test]
    fn mark_lost_keeps_amount() {
        let mut record = make_record();
        record.mark_lost().unwrap();
        assert_eq!(record.status, BetStatus::Lost);
        assert_eq!(record.amount.as_str(), "FHE-MQ==");
    }

    #[test]
    fn double_settlement_blocked() {
        let mut record = make_record();
        record.mark_won(ObscuredToken::from_raw("FHE-Mg==")).unwrap();
        let err = record.mark_lost().unwrap_err();
        assert!(matches!(
            err,
            WagerError::InvalidTransition {
                from: BetStatus::Won,
                to: BetStatus::Lost
            }
        ));
        // A rejected win must not touch the amount either.
        let err = record.mark_won(ObscuredToken::from_raw("FHE-NA==")).unwrap_err();
        assert!(matches!(err, WagerError::InvalidTransition { .. }));
        assert_eq!(record.amount.as_str(), "FHE-Mg==");
    }

    #[test]
    fn canceled_cannot_be_settled() {
        let mut record = make_record();
        record.mark_canceled().unwrap();
        assert!(record.mark_lost().is_err());
        assert!(record.mark_canceled().is_err());
    }

    #[test]
    fn wire_field_names() {
        let record = make_record();
        let value = serde_json::to_value(&record).unwrap();
        for field in [
            "amount",
            "timestamp",
            "better",
            "gameId",
            "prediction",
            "odds",
            "status",
        ] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["status"], "pending");
        assert!(value["odds"].is_number());
    }

    #[test]
    fn legacy_record_defaults() {
        let json = r#"{
            "amount": "FHE-MQ==",
            "timestamp": 1700000000,
            "better": "0xABCDEF0123456789abcdef0123456789ABCDEF01",
            "gameId": "DOTA2",
            "prediction": "Radiant"
        }"#;
        let record: BetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, BetStatus::Pending);
        assert_eq!(record.odds, Decimal::new(15, 1));
        assert_eq!(record.version, 0);
    }

    #[test]
    fn null_and_falsy_fields_take_legacy_defaults() {
        let json = r#"{
            "amount": "FHE-MQ==",
            "timestamp": 1700000000,
            "better": "0xABCDEF0123456789abcdef0123456789ABCDEF01",
            "gameId": "DOTA2",
            "prediction": "Radiant",
            "odds": null,
            "status": null
        }"#;
        let record: BetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.odds, Decimal::new(15, 1));
        assert_eq!(record.status, BetStatus::Pending);

        let zero = json.replace("\"odds\": null", "\"odds\": 0").replace("\"status\": null", "\"status\": \"\"");
        let record: BetRecord = serde_json::from_str(&zero).unwrap();
        assert_eq!(record.odds, Decimal::new(15, 1));
        assert_eq!(record.status, BetStatus::Pending);
    }

    #[test]
    fn stored_odds_and_status_survive_a_read() {
        let mut record = make_record();
        record.mark_lost().unwrap();
        let back: BetRecord = serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(back.odds, Decimal::new(175, 2));
        assert_eq!(back.status, BetStatus::Lost);

        let bogus = serde_json::to_string(&record).unwrap().replace("\"lost\"", "\"void\"");
        assert!(serde_json::from_str::<BetRecord>(&bogus).is_err());
    }

    #[test]
    fn filter_matches_game_or_prediction_ignoring_case() {
        let record = make_record(); // LOL, "Team A wins"
        let search = |term: &str| BetFilter {
            search: Some(term.to_string()),
            status: None,
        };
        assert!(search("lol").matches(&record));
        assert!(search("TEAM a").matches(&record));
        assert!(!search("dota").matches(&record));
        assert!(search("").matches(&record));
        assert!(BetFilter::default().matches(&record));
    }

    #[test]
    fn filter_combines_search_and_status() {
        let mut record = make_record();
        let pending_lol = BetFilter {
            search: Some("Lol".into()),
            status: Some(BetStatus::Pending),
        };
        assert!(pending_lol.matches(&record));
        record.mark_won(ObscuredToken::from_raw("FHE-Mg==")).unwrap();
        assert!(!pending_lol.matches(&record));
        let won_dota = BetFilter {
            search: Some("dota".into()),
            status: Some(BetStatus::Won),
        };
        assert!(!won_dota.matches(&record));
    }

    #[test]
    fn ownership_is_case_insensitive() {
        let mut record = make_record();
        record.bettor = BettorAddress::dummy(0xab);
        let upper: BettorAddress = format!("0x{}", "AB".repeat(20)).parse().unwrap();
        assert!(record.is_owned_by(&upper));
        assert!(!record.is_owned_by(&BettorAddress::dummy(2)));
    }

    #[test]
    fn stats_count_by_status() {
        let mut won = make_record();
        won.mark_won(ObscuredToken::from_raw("FHE-Mg==")).unwrap();
        let mut lost = make_record();
        lost.mark_lost().unwrap();
        let bets: Vec<Bet> = [make_record(), make_record(), won, lost]
            .into_iter()
            .enumerate()
            .map(|(i, record)| Bet {
                key: BetKey::from(format!("k{i}")),
                record,
            })
            .collect();
        let stats = BetStats::from_bets(&bets);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.won, 1);
        assert_eq!(stats.lost, 1);
        assert_eq!(stats.canceled, 0);
        assert_eq!(stats.total(), 4);
    }
}
