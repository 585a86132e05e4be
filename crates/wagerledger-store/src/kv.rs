//! The external key/value service boundary.
//!
//! The ledger treats its backing store as an opaque byte-oriented service
//! with three calls: `get_data`, `set_data` and `is_available`. An empty
//! byte string from `get_data` means the key is absent.
//!
//! Two optional capabilities have default implementations:
//! - [`KeyValueStore::compare_and_set`] falls back to read-compare-write,
//!   which is **not** atomic. Stores that can do better should override it.
//! - [`KeyValueStore::keys_with_prefix`] reports [`WagerError::ScanUnsupported`].

use std::{
    collections::{BTreeMap, HashSet},
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::Mutex;
use wagerledger_types::{Result, WagerError};

/// Byte-oriented key/value service backing the ledger.
pub trait KeyValueStore: Send + Sync {
    /// Read the bytes under `key`. Absent keys yield an empty vector.
    fn get_data(&self, key: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Overwrite the bytes under `key`.
    fn set_data(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

    /// Whether the service currently accepts calls.
    fn is_available(&self) -> impl Future<Output = bool> + Send;

    /// Write `value` only if the current bytes equal `expected`
    /// (empty `expected` means "key must be absent"). Returns whether the
    /// write happened.
    fn compare_and_set(
        &self,
        key: &str,
        expected: &[u8],
        value: Vec<u8>,
    ) -> impl Future<Output = Result<bool>> + Send {
        async move {
            let current = self.get_data(key).await?;
            if current.as_slice() != expected {
                return Ok(false);
            }
            self.set_data(key, value).await?;
            Ok(true)
        }
    }

    /// All stored keys starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> impl Future<Output = Result<Vec<String>>> + Send {
        let _ = prefix;
        async { Err(WagerError::ScanUnsupported) }
    }
}

/// In-memory store for tests and local development.
///
/// `compare_and_set` is atomic (one lock covers the read and the write).
/// With the `test-helpers` feature, availability and per-key write failures
/// can be toggled to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    failing_keys: Mutex<HashSet<String>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(WagerError::StoreUnavailable {
                reason: "in-memory store marked unavailable".into(),
            });
        }
        Ok(())
    }

    async fn check_writable(&self, key: &str) -> Result<()> {
        self.check_available()?;
        if self.failing_keys.lock().await.contains(key) {
            return Err(WagerError::StoreUnavailable {
                reason: format!("write to {key} rejected"),
            });
        }
        Ok(())
    }
}

/// Failure injection for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl InMemoryStore {
    /// Mark the store (un)available. Reads and writes fail while unavailable.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Make every subsequent write to `key` fail.
    pub async fn fail_writes_to(&self, key: &str) {
        self.failing_keys.lock().await.insert(key.to_string());
    }

    /// Undo [`InMemoryStore::fail_writes_to`] for every key.
    pub async fn clear_write_failures(&self) {
        self.failing_keys.lock().await.clear();
    }
}

impl KeyValueStore for InMemoryStore {
    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        self.check_available()?;
        Ok(self
            .entries
            .lock()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.check_writable(key).await?;
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    async fn compare_and_set(&self, key: &str, expected: &[u8], value: Vec<u8>) -> Result<bool> {
        self.check_writable(key).await?;
        let mut entries = self.entries.lock().await;
        let current = entries.get(key).map_or(&[][..], Vec::as_slice);
        if current != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), value);
        Ok(true)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self
            .entries
            .lock()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Several clients sharing one service.
impl<T: KeyValueStore> KeyValueStore for Arc<T> {
    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        (**self).get_data(key).await
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).set_data(key, value).await
    }

    async fn is_available(&self) -> bool {
        (**self).is_available().await
    }

    async fn compare_and_set(&self, key: &str, expected: &[u8], value: Vec<u8>) -> Result<bool> {
        (**self).compare_and_set(key, expected, value).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys_with_prefix(prefix).await
    }
}
