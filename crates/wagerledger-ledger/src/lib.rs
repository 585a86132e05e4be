//! # wagerledger-ledger
//!
//! **Bet Record Manager** and **Settlement State Machine**.
//!
//! ## Architecture
//!
//! [`BetManager`] is the in-process surface used by a client:
//! 1. `create_bet` validates, draws odds, encodes the stake, inserts the
//!    record and appends its key to the index
//! 2. `list_bets` / `bets_for` / `stats` read through the index, skipping
//!    unreadable entries
//! 3. `settle` / `cancel_bet` move a pending bet to a terminal status in
//!    one versioned write
//! 4. `decrypt_bet` reveals a stake through the disclosure gate
//! 5. `reconcile_index` repairs the index after a partial create
//!
//! Clients never coordinate with each other; the store's compare-and-set
//! is the only arbiter between concurrent writers.

pub mod manager;
pub mod reconcile;
pub mod settlement;

pub use manager::BetManager;
pub use reconcile::ReconcileReport;
pub use settlement::{PAYOUT_OPERATION, apply_outcome};
