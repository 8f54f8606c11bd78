//! Cached object storage with deferred persistence.
//!
//! [`ObjectStorage`] keeps live objects in memory, shares them as `Arc`s
//! and writes modified ones to a [`KVStore`] on [`ObjectStorage::flush`].
//! Persistence is eventual: an in-memory mutation is visible to every
//! holder of the `Arc` immediately and reaches the backend on the next
//! flush (or at once with `persist_on_store`).

use crate::config::StorageConfig;
use crate::error::{key_to_hex, Result, StorageError};
use crate::kvstore::KVStore;
use crate::object::StorableObject;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Counts of backend writes performed by a flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub written: usize,
    pub deleted: usize,
}

/// Object cache in front of a key/value backend.
pub struct ObjectStorage<T: StorableObject> {
    backend: Arc<dyn KVStore>,
    config: StorageConfig,
    cache: RwLock<HashMap<Vec<u8>, Arc<T>>>,
}

impl<T: StorableObject> ObjectStorage<T> {
    /// Create a storage over `backend`.
    pub fn new(backend: Arc<dyn KVStore>, config: StorageConfig) -> Self {
        ObjectStorage {
            backend,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Number of objects currently held in memory.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    fn backend_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.config.realm.len() + key.len());
        full.extend_from_slice(self.config.realm.as_bytes());
        full.extend_from_slice(key);
        full
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        match self.config.key_length() {
            Some(expected) if expected != key.len() => Err(StorageError::InvalidKeyLength {
                expected,
                actual: key.len(),
            }),
            _ => Ok(()),
        }
    }

    fn restore(&self, key: &[u8], value: &[u8]) -> Result<T> {
        T::from_object_storage(key, value).map_err(|err| StorageError::Restore {
            key: key_to_hex(key),
            source: Box::new(err),
        })
    }

    /// Write `object` if it is modified. The flag is cleared before the
    /// value is read, so a change made during the write keeps the object
    /// dirty for the next flush.
    fn persist(&self, object: &T) -> Result<bool> {
        if !object.flags().take_modified() {
            return Ok(false);
        }
        let key = self.backend_key(&object.object_storage_key());
        if let Err(err) = self.backend.set(&key, &object.object_storage_value()) {
            object.flags().set_modified(true);
            return Err(err);
        }
        Ok(true)
    }

    fn load_from_backend(&self, key: &[u8]) -> Result<Option<T>> {
        match self.backend.get(&self.backend_key(key))? {
            Some(value) => self.restore(key, &value).map(Some),
            None => Ok(None),
        }
    }

    /// Store an object, replacing any object with the same key.
    pub fn store(&self, object: T) -> Result<Arc<T>> {
        let key = object.object_storage_key();
        self.check_key(&key)?;

        object.flags().set_modified(true);
        let object = Arc::new(object);
        self.cache.write().insert(key, Arc::clone(&object));

        if self.config.persist_on_store {
            self.persist(&object)?;
        }
        Ok(object)
    }

    /// Store an object unless one with the same key already exists.
    ///
    /// Returns the stored object, or `None` if the key was taken.
    pub fn store_if_absent(&self, object: T) -> Result<Option<Arc<T>>> {
        let key = object.object_storage_key();
        let (stored, created) = self.compute_if_absent(&key, || object)?;
        Ok(created.then_some(stored))
    }

    /// Return the object stored under `key`, creating it with `create` if
    /// there is none. The flag is `true` when the object was created.
    ///
    /// Lookup and creation happen under one write lock, so concurrent
    /// callers for the same key agree on a single object.
    pub fn compute_if_absent(&self, key: &[u8], create: impl FnOnce() -> T) -> Result<(Arc<T>, bool)> {
        self.check_key(key)?;

        let mut cache = self.cache.write();
        if let Some(existing) = cache.get(key) {
            if !existing.flags().is_deleted() {
                return Ok((Arc::clone(existing), false));
            }
        } else if let Some(restored) = self.load_from_backend(key)? {
            let restored = Arc::new(restored);
            cache.insert(key.to_vec(), Arc::clone(&restored));
            return Ok((restored, false));
        }

        let object = create();
        object.flags().set_modified(true);
        let object = Arc::new(object);
        cache.insert(key.to_vec(), Arc::clone(&object));
        drop(cache);

        if self.config.persist_on_store {
            self.persist(&object)?;
        }
        Ok((object, true))
    }

    /// Load the object stored under `key`.
    pub fn load(&self, key: &[u8]) -> Result<Option<Arc<T>>> {
        if let Some(cached) = self.cache.read().get(key) {
            return Ok((!cached.flags().is_deleted()).then(|| Arc::clone(cached)));
        }

        // A delete and flush may have run since the read lock was released.
        let mut cache = self.cache.write();
        if let Some(cached) = cache.get(key) {
            return Ok((!cached.flags().is_deleted()).then(|| Arc::clone(cached)));
        }
        let Some(restored) = self.load_from_backend(key)? else {
            return Ok(None);
        };
        let restored = Arc::new(restored);
        cache.insert(key.to_vec(), Arc::clone(&restored));
        Ok(Some(restored))
    }

    /// Check whether an object exists under `key`.
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.load(key)?.is_some())
    }

    /// Mark the object under `key` deleted. The backend entry is removed on
    /// the next flush. Returns whether a live object existed.
    ///
    /// The check and the tombstone happen under one write lock, so of two
    /// concurrent deletes of the same key exactly one returns `true`.
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        let mut cache = self.cache.write();
        let object = match cache.get(key) {
            Some(cached) if cached.flags().is_deleted() => return Ok(false),
            Some(cached) => Arc::clone(cached),
            None => match self.load_from_backend(key)? {
                Some(restored) => {
                    let restored = Arc::new(restored);
                    cache.insert(key.to_vec(), Arc::clone(&restored));
                    restored
                }
                None => return Ok(false),
            },
        };

        object.flags().set_deleted(true);
        object.flags().set_modified(true);
        if self.config.persist_on_store {
            self.backend.delete(&self.backend_key(key))?;
            cache.remove(key);
        }
        Ok(true)
    }

    /// All live objects whose key starts with `prefix`.
    pub fn load_by_prefix(&self, prefix: &[u8]) -> Result<Vec<Arc<T>>> {
        let mut found: HashMap<Vec<u8>, Arc<T>> = self
            .cache
            .read()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| (key.clone(), Arc::clone(object)))
            .collect();

        let realm_len = self.config.realm.len();
        for (full_key, value) in self.backend.scan_prefix(&self.backend_key(prefix))? {
            let key = &full_key[realm_len..];
            if !found.contains_key(key) {
                let restored = Arc::new(self.restore(key, &value)?);
                found.insert(key.to_vec(), restored);
            }
        }

        let mut objects: Vec<(Vec<u8>, Arc<T>)> = found
            .into_iter()
            .filter(|(_, object)| !object.flags().is_deleted())
            .collect();
        objects.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(objects.into_iter().map(|(_, object)| object).collect())
    }

    /// Write modified objects to the backend and drop deleted ones.
    pub fn flush(&self) -> Result<FlushStats> {
        let mut stats = FlushStats::default();
        let mut cache = self.cache.write();

        let mut tombstones = Vec::new();
        for (key, object) in cache.iter() {
            if object.flags().is_deleted() {
                self.backend.delete(&self.backend_key(key))?;
                tombstones.push(key.clone());
                stats.deleted += 1;
            } else if self.persist(object)? {
                stats.written += 1;
            }
        }
        for key in tombstones {
            cache.remove(&key);
        }

        debug!(
            realm = %self.config.realm,
            written = stats.written,
            deleted = stats.deleted,
            "flushed object storage"
        );
        Ok(stats)
    }

    /// Flush and then drop every cached object.
    pub fn shutdown(&self) -> Result<FlushStats> {
        let stats = self.flush()?;
        self.cache.write().clear();
        Ok(stats)
    }
}
