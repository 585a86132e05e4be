//! Settlement of pending bets.
//!
//! ```text
//! settle(key, won)  : amount <- transform(amount, double), status <- won
//! settle(key, lost) : status <- lost
//! ```
//!
//! The payout transform and the status flip land in one versioned write, or
//! not at all. The payout is a fixed doubling of the stake; the bet's odds
//! are informational and do not enter the calculation.

use wagerledger_codec::{AmountCodec, OperationTag};
use wagerledger_store::KeyValueStore;
use wagerledger_types::{BetKey, BetRecord, Outcome, Result, WagerError};

use crate::manager::BetManager;

/// Operation applied to a winning stake.
pub const PAYOUT_OPERATION: OperationTag = OperationTag::Double;

/// Compute the settled form of `record` without touching storage.
///
/// The transition is checked before the amount is transformed, so a
/// terminal record reports `InvalidTransition` even if its token is
/// unreadable.
pub fn apply_outcome<C: AmountCodec>(
    record: &BetRecord,
    outcome: Outcome,
    codec: &C,
) -> Result<BetRecord> {
    let target = outcome.status();
    if !record.status.can_transition_to(target) {
        return Err(WagerError::InvalidTransition {
            from: record.status,
            to: target,
        });
    }
    let mut next = record.clone();
    match outcome {
        Outcome::Won => {
            let payout = codec.transform(&record.amount, PAYOUT_OPERATION)?;
            next.mark_won(payout)?;
        }
        Outcome::Lost => next.mark_lost()?,
    }
    Ok(next)
}

impl<S: KeyValueStore, C: AmountCodec + Clone> BetManager<S, C> {
    /// Settle a pending bet.
    ///
    /// # Errors
    /// - `NotFound` if no record exists under `key`
    /// - `InvalidTransition` if the bet is not pending
    /// - `MalformedToken` if a winning stake cannot be decoded
    /// - `StaleWrite` if the record changed since it was read
    pub async fn settle(&self, key: &BetKey, outcome: Outcome) -> Result<BetRecord> {
        self.store.ensure_available().await?;
        let stored = self.read_existing(key).await?;
        let next = apply_outcome(&stored.record, outcome, &self.codec)?;
        let written = self.store.replace_record(key, &stored, next).await?;
        tracing::info!(key = %key, outcome = %outcome, version = written.version, "Bet settled");
        Ok(written)
    }
}
