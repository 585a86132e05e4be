//! Index reconciliation.
//!
//! Bet creation writes the record before appending its key, so a failure in
//! between leaves an *orphan*: a stored record the index does not name. The
//! reverse, a *dangling* index entry with no record behind it, only appears
//! through outside corruption.
//!
//! Reconciliation needs a store that can enumerate keys by prefix. Orphans
//! are appended in creation order; dangling entries are reported and left in
//! place since the index is append-only.

use std::collections::BTreeSet;

use wagerledger_codec::AmountCodec;
use wagerledger_store::KeyValueStore;
use wagerledger_types::{BetKey, Result};

use crate::manager::BetManager;

/// What a reconciliation pass found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Orphaned record keys appended to the index, oldest first.
    pub adopted: Vec<BetKey>,
    /// Index entries with no stored record.
    pub dangling: Vec<BetKey>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.adopted.is_empty() && self.dangling.is_empty()
    }
}

impl<S: KeyValueStore, C: AmountCodec + Clone> BetManager<S, C> {
    /// Bring the index back in line with the stored records.
    ///
    /// # Errors
    /// - `ScanUnsupported` if the store cannot enumerate keys
    /// - `StaleWrite` if the index changes concurrently while adopting
    pub async fn reconcile_index(&self) -> Result<ReconcileReport> {
        self.store.ensure_available().await?;
        let stored: BTreeSet<BetKey> = self.store.scan_record_keys().await?.into_iter().collect();
        let indexed = self.store.read_index().await?;
        let indexed_set: BTreeSet<&BetKey> = indexed.iter().collect();

        let mut orphans = Vec::new();
        for key in stored.iter().filter(|k| !indexed_set.contains(k)) {
            // Unparseable records would be skipped by every listing anyway.
            match self.store.read_record(key).await? {
                Some(record) => orphans.push((record.timestamp, key.clone())),
                None => tracing::warn!(key = %key, "Orphaned record is unreadable, not adopting"),
            }
        }
        orphans.sort();

        let mut report = ReconcileReport {
            dangling: indexed
                .iter()
                .filter(|k| !stored.contains(*k))
                .cloned()
                .collect(),
            ..ReconcileReport::default()
        };
        for (_, key) in orphans {
            if self.store.append_key(&key).await? {
                report.adopted.push(key);
            }
        }

        if report.is_clean() {
            tracing::debug!("Index reconciled, nothing to do");
        } else {
            tracing::info!(
                adopted = report.adopted.len(),
                dangling = report.dangling.len(),
                "Index reconciled"
            );
        }
        Ok(report)
    }
}
