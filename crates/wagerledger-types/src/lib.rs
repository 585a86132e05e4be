//! # wagerledger-types
//!
//! Shared types, errors, and configuration for the **WagerLedger** private
//! betting ledger.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`BetKey`], [`BettorAddress`], [`GameId`]
//! - **Record model**: [`BetRecord`], [`BetStatus`], [`Outcome`], [`Bet`], [`BetStats`], [`BetFilter`]
//! - **Tokens**: [`ObscuredToken`], [`TokenScheme`]
//! - **Configuration**: [`WagerConfig`], [`LedgerConfig`], [`DisclosureConfig`]
//! - **Errors**: [`WagerError`] with `WL_ERR_` prefix codes
//! - **Constants**: defaults and storage key names
//! - **Time**: [`time::now_secs`]

pub mod bet;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod time;
pub mod token;

// Re-export all primary types at crate root for ergonomic imports:
//   use wagerledger_types::{BetRecord, BetStatus, WagerError, ...};

pub use bet::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use token::*;

// Constants are accessed via `wagerledger_types::constants::FOO`
// (not re-exported to avoid name collisions).
