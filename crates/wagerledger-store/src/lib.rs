//! # wagerledger-store
//!
//! **Ledger Store Adapter**: persistence of the bet key index and bet
//! records through an external, opaque key/value service.
//!
//! - [`KeyValueStore`]: the consumed boundary (`get_data`, `set_data`,
//!   `is_available`, plus optional compare-and-set and prefix scan)
//! - [`InMemoryStore`]: a local implementation for tests and development
//! - [`LedgerStore`]: typed index/record operations with tolerant reads and
//!   versioned writes

pub mod adapter;
pub mod kv;

pub use adapter::{LedgerStore, StoredRecord};
pub use kv::{InMemoryStore, KeyValueStore};
