//! Key/value backend trait and an in-memory implementation.

use crate::error::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Byte-keyed storage backend.
///
/// Implementations must be safe to share between threads; the object
/// storage calls them from whichever thread flushes or loads.
pub trait KVStore: Send + Sync {
    /// Load the value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove `key`. Returns whether it existed.
    fn delete(&self, key: &[u8]) -> Result<bool>;

    /// Check whether `key` exists.
    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// All entries whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory implementation of [`KVStore`] backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryKVStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKVStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        MemoryKVStore {
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl KVStore for MemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
