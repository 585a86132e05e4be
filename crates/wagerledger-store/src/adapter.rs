//! Ledger store adapter: index and record persistence over a [`KeyValueStore`].
//!
//! Layout:
//! ```text
//! index_key            -> JSON array of bet keys (append-only)
//! record_prefix || key -> JSON object (BetRecord)
//! ```
//!
//! Payload problems never escape as errors on the read path: an
//! unparseable index reads as empty and an unparseable record reads as
//! absent, each with a warning. Store failures do surface, as
//! [`WagerError::StoreUnavailable`].
//!
//! Mutations of existing records go through [`LedgerStore::replace_record`],
//! which checks the record's `version` and swaps against the exact bytes that
//! were read, so a concurrent writer is rejected rather than overwritten.

use tokio::sync::RwLock;
use wagerledger_types::{BetKey, BetRecord, LedgerConfig, Result, WagerError};

use crate::kv::KeyValueStore;

/// A record together with the exact bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub record: BetRecord,
    raw: Vec<u8>,
}

/// Typed ledger persistence on top of an opaque key/value store.
pub struct LedgerStore<S> {
    store: S,
    index_key: String,
    record_prefix: String,
    /// Last index seen on this client. Only consulted to skip re-appending
    /// a known key; never trusted for reads.
    index_cache: RwLock<Vec<BetKey>>,
}

impl<S: KeyValueStore> LedgerStore<S> {
    pub fn new(store: S, config: &LedgerConfig) -> Self {
        Self {
            store,
            index_key: config.index_key.clone(),
            record_prefix: config.record_prefix.clone(),
            index_cache: RwLock::new(Vec::new()),
        }
    }

    /// The underlying key/value service.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Fail with `StoreUnavailable` unless the store reports itself available.
    pub async fn ensure_available(&self) -> Result<()> {
        if self.store.is_available().await {
            Ok(())
        } else {
            Err(WagerError::StoreUnavailable {
                reason: "store reports not available".into(),
            })
        }
    }

    // -----------------------------------------------------------------
    // Index
    // -----------------------------------------------------------------

    async fn load_index(&self) -> Result<(Vec<BetKey>, Vec<u8>)> {
        let raw = self.store.get_data(&self.index_key).await?;
        if raw.is_empty() {
            return Ok((Vec::new(), raw));
        }
        let keys = match serde_json::from_slice::<Vec<String>>(&raw) {
            Ok(keys) => keys.into_iter().map(BetKey::from).collect(),
            Err(e) => {
                tracing::warn!(index_key = %self.index_key, error = %e, "Unparseable bet key index, treating as empty");
                Vec::new()
            }
        };
        *self.index_cache.write().await = keys.clone();
        Ok((keys, raw))
    }

    /// All keys in the index, in insertion order.
    pub async fn read_index(&self) -> Result<Vec<BetKey>> {
        Ok(self.load_index().await?.0)
    }

    /// Append `key` to the index unless already present.
    ///
    /// Returns `true` if the key was appended. The index is append-only, so
    /// a key this client has already seen in it is skipped without a store
    /// round trip. Otherwise the index write is a compare-and-set against the
    /// bytes just read; losing that race yields `StaleWrite` and nothing is
    /// written.
    pub async fn append_key(&self, key: &BetKey) -> Result<bool> {
        if self.index_cache.read().await.contains(key) {
            return Ok(false);
        }
        let (mut keys, raw) = self.load_index().await?;
        if keys.contains(key) {
            return Ok(false);
        }
        keys.push(key.clone());
        let bytes = serde_json::to_vec(&keys)?;
        if !self.store.compare_and_set(&self.index_key, &raw, bytes).await? {
            tracing::warn!(key = %key, "Index changed concurrently, append rejected");
            return Err(WagerError::StaleWrite(key.clone()));
        }
        *self.index_cache.write().await = keys;
        Ok(true)
    }

    // -----------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------

    /// Read a record with its raw bytes. Absent or malformed yields `None`.
    pub async fn read_stored(&self, key: &BetKey) -> Result<Option<StoredRecord>> {
        let raw = self
            .store
            .get_data(&key.storage_key(&self.record_prefix))
            .await?;
        if raw.is_empty() {
            return Ok(None);
        }
        match serde_json::from_slice::<BetRecord>(&raw) {
            Ok(record) => Ok(Some(StoredRecord { record, raw })),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Unparseable bet record");
                Ok(None)
            }
        }
    }

    /// Read a record. Absent or malformed yields `None`.
    pub async fn read_record(&self, key: &BetKey) -> Result<Option<BetRecord>> {
        Ok(self.read_stored(key).await?.map(|stored| stored.record))
    }

    /// Unconditional write: last writer wins.
    pub async fn write_record(&self, key: &BetKey, record: &BetRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.store
            .set_data(&key.storage_key(&self.record_prefix), bytes)
            .await
    }

    /// Write a brand-new record; fails with `StaleWrite` if the key is taken.
    pub async fn insert_record(&self, key: &BetKey, record: &BetRecord) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        let written = self
            .store
            .compare_and_set(&key.storage_key(&self.record_prefix), &[], bytes)
            .await?;
        if written {
            Ok(())
        } else {
            Err(WagerError::StaleWrite(key.clone()))
        }
    }

    /// Replace a previously read record with `next`, bumping its version.
    ///
    /// `next.version` must equal the version that was read. The write is
    /// swapped against the exact bytes of `previous`.
    pub async fn replace_record(
        &self,
        key: &BetKey,
        previous: &StoredRecord,
        mut next: BetRecord,
    ) -> Result<BetRecord> {
        if next.version != previous.record.version {
            return Err(WagerError::StaleWrite(key.clone()));
        }
        next.version += 1;
        let bytes = serde_json::to_vec(&next)?;
        let written = self
            .store
            .compare_and_set(&key.storage_key(&self.record_prefix), &previous.raw, bytes)
            .await?;
        if !written {
            tracing::warn!(key = %key, version = previous.record.version, "Record changed concurrently, write rejected");
            return Err(WagerError::StaleWrite(key.clone()));
        }
        Ok(next)
    }

    /// Every bet key that has a stored record (requires store enumeration).
    pub async fn scan_record_keys(&self) -> Result<Vec<BetKey>> {
        let keys = self.store.keys_with_prefix(&self.record_prefix).await?;
        Ok(keys
            .iter()
            .filter(|k| **k != self.index_key)
            .filter_map(|k| BetKey::from_storage_key(k, &self.record_prefix))
            .collect())
    }
}
