//! Bet Record Manager: create, list, cancel and disclose bets.
//!
//! The manager owns the authoritative key index (through [`LedgerStore`])
//! and enforces record shape on creation. Every operation first checks that
//! the store reports itself available.
//!
//! Creation is a two-phase write: the record is inserted first, then its key
//! is appended to the index. If the second phase fails the record is an
//! orphan until `reconcile_index` adopts it.

use std::cmp::Reverse;

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use wagerledger_codec::{AmountCodec, TaggedBase64Codec};
use wagerledger_disclosure::{DisclosureChallenge, DisclosureGate, MessageSigner};
use wagerledger_store::{KeyValueStore, LedgerStore, StoredRecord};
use wagerledger_types::{
    Bet, BetFilter, BetKey, BetRecord, BetStats, BetStatus, BettorAddress, GameId, LedgerConfig, Result,
    WagerConfig, WagerError, constants, time,
};

/// Entry point for all ledger operations of one client.
pub struct BetManager<S, C = TaggedBase64Codec> {
    pub(crate) store: LedgerStore<S>,
    pub(crate) codec: C,
    gate: DisclosureGate<C>,
    config: LedgerConfig,
}

impl<S: KeyValueStore> BetManager<S> {
    /// Manager using the default codec.
    pub fn new(store: S, config: &WagerConfig) -> Self {
        Self::with_codec(store, config, TaggedBase64Codec)
    }
}

impl<S: KeyValueStore, C: AmountCodec + Clone> BetManager<S, C> {
    pub fn with_codec(store: S, config: &WagerConfig, codec: C) -> Self {
        Self {
            store: LedgerStore::new(store, &config.ledger),
            gate: DisclosureGate::with_codec(&config.disclosure, codec.clone()),
            codec,
            config: config.ledger.clone(),
        }
    }

    /// Replace the disclosure gate (e.g. one holding a verifying key).
    #[must_use]
    pub fn with_gate(mut self, gate: DisclosureGate<C>) -> Self {
        self.gate = gate;
        self
    }

    /// Typed store access.
    pub fn store(&self) -> &LedgerStore<S> {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// All readable bets, newest first.
    ///
    /// Index entries whose record is absent, malformed, or fails to load are
    /// skipped. Availability and index read failures still fail the listing.
    /// Ties on timestamp are broken by key, descending, so the order is
    /// stable within one read.
    pub async fn list_bets(&self) -> Result<Vec<Bet>> {
        self.store.ensure_available().await?;
        let keys = self.store.read_index().await?;
        let mut bets = Vec::with_capacity(keys.len());
        for key in keys {
            match self.store.read_record(&key).await {
                Ok(Some(record)) => bets.push(Bet { key, record }),
                Ok(None) => tracing::warn!(key = %key, "Skipping unreadable bet"),
                Err(e) => tracing::warn!(key = %key, error = %e, "Error loading bet, skipping"),
            }
        }
        bets.sort_by_key(|bet| Reverse((bet.record.timestamp, bet.key.clone())));
        Ok(bets)
    }

    /// Bets placed by `bettor`, newest first.
    pub async fn bets_for(&self, bettor: &BettorAddress) -> Result<Vec<Bet>> {
        let mut bets = self.list_bets().await?;
        bets.retain(|bet| bet.record.is_owned_by(bettor));
        Ok(bets)
    }

    /// Bets matching `filter`, newest first.
    pub async fn search_bets(&self, filter: &BetFilter) -> Result<Vec<Bet>> {
        let mut bets = self.list_bets().await?;
        bets.retain(|bet| filter.matches(&bet.record));
        Ok(bets)
    }

    /// Status counts over the current listing.
    pub async fn stats(&self) -> Result<BetStats> {
        Ok(BetStats::from_bets(&self.list_bets().await?))
    }

    /// One bet by key.
    pub async fn bet(&self, key: &BetKey) -> Result<Bet> {
        self.store.ensure_available().await?;
        let record = self
            .store
            .read_record(key)
            .await?
            .ok_or_else(|| WagerError::NotFound(key.clone()))?;
        Ok(Bet {
            key: key.clone(),
            record,
        })
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Place a new pending bet and return its key.
    ///
    /// # Errors
    /// - `InvalidBet` if the game is empty or inactive, the prediction is
    ///   empty or too long, or the amount is not positive
    /// - `StaleWrite` if the generated key is already taken, or the index
    ///   changed concurrently (the record then exists but is unindexed)
    pub async fn create_bet(
        &self,
        game_id: GameId,
        prediction: impl Into<String>,
        amount: Decimal,
        bettor: BettorAddress,
    ) -> Result<BetKey> {
        self.store.ensure_available().await?;
        let prediction = prediction.into();
        self.validate_new_bet(&game_id, &prediction, amount)?;
        let odds = self.draw_odds()?;

        let key = BetKey::generate();
        let record = BetRecord {
            amount: self.codec.encode(amount),
            timestamp: time::now_secs(),
            bettor,
            game_id,
            prediction,
            odds,
            status: BetStatus::Pending,
            version: 0,
        };
        self.store.insert_record(&key, &record).await?;
        self.store.append_key(&key).await?;

        tracing::info!(
            key = %key,
            game = %record.game_id,
            bettor = %bettor.short(),
            odds = %odds,
            "Bet created"
        );
        Ok(key)
    }

    /// Cancel a pending bet on behalf of its bettor.
    ///
    /// # Errors
    /// - `NotFound` if no record exists under `key`
    /// - `NotOwner` if `requester` did not place the bet
    /// - `InvalidTransition` if the bet is already terminal
    /// - `StaleWrite` if the record changed since it was read
    pub async fn cancel_bet(&self, key: &BetKey, requester: &BettorAddress) -> Result<()> {
        self.store.ensure_available().await?;
        let stored = self.read_existing(key).await?;
        if !stored.record.is_owned_by(requester) {
            tracing::warn!(key = %key, requester = %requester.short(), "Cancel refused, not the bettor");
            return Err(WagerError::NotOwner(key.clone()));
        }
        let mut next = stored.record.clone();
        next.mark_canceled()?;
        self.store.replace_record(key, &stored, next).await?;
        tracing::info!(key = %key, "Bet canceled");
        Ok(())
    }

    /// Reveal a bet's amount after a fresh wallet signature over `challenge`.
    pub async fn decrypt_bet<M: MessageSigner>(
        &self,
        key: &BetKey,
        challenge: &DisclosureChallenge,
        signer: &M,
    ) -> Result<Decimal> {
        let bet = self.bet(key).await?;
        self.gate
            .decrypt_with_authorization(&bet.record.amount, challenge, signer)
            .await
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    pub(crate) async fn read_existing(&self, key: &BetKey) -> Result<StoredRecord> {
        self.store
            .read_stored(key)
            .await?
            .ok_or_else(|| WagerError::NotFound(key.clone()))
    }

    fn validate_new_bet(&self, game_id: &GameId, prediction: &str, amount: Decimal) -> Result<()> {
        if game_id.is_empty() {
            return Err(WagerError::InvalidBet {
                reason: "game id must not be empty".into(),
            });
        }
        if !self.config.is_active_game(game_id) {
            return Err(WagerError::InvalidBet {
                reason: format!("game {game_id} is not active"),
            });
        }
        if prediction.trim().is_empty() {
            return Err(WagerError::InvalidBet {
                reason: "prediction must not be empty".into(),
            });
        }
        if prediction.len() > constants::MAX_PREDICTION_LEN {
            return Err(WagerError::InvalidBet {
                reason: format!(
                    "prediction exceeds {} bytes",
                    constants::MAX_PREDICTION_LEN
                ),
            });
        }
        if amount <= Decimal::ZERO {
            return Err(WagerError::InvalidBet {
                reason: format!("amount must be positive, got {amount}"),
            });
        }
        Ok(())
    }

    /// Uniform odds in `[odds_min, odds_max)` at basis-point resolution.
    fn draw_odds(&self) -> Result<Decimal> {
        let (min, max) = (
            to_bps(self.config.odds_min)?,
            to_bps(self.config.odds_max)?,
        );
        if min >= max {
            return Err(WagerError::Configuration(format!(
                "odds range [{}, {}) is empty at basis-point resolution",
                self.config.odds_min, self.config.odds_max
            )));
        }
        let bps = rand::thread_rng().gen_range(min..max);
        Ok(Decimal::new(bps, constants::ODDS_BPS_SCALE).normalize())
    }
}

fn to_bps(odds: Decimal) -> Result<i64> {
    let scale = Decimal::new(10_i64.pow(constants::ODDS_BPS_SCALE), 0);
    odds.checked_mul(scale)
        .and_then(|bps| bps.trunc().to_i64())
        .ok_or_else(|| WagerError::Configuration(format!("odds bound {odds} out of range")))
}
