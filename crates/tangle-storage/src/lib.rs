//! # tangle-storage
//!
//! Object storage contract for the tangle message layer.
//!
//! Objects describe themselves as a key/value pair through
//! [`StorableObject`]; an [`ObjectStorage`] caches live objects, tracks
//! which ones were modified and writes them to a [`KVStore`] backend on
//! flush. Keys of composite objects can be scanned by prefix, which is how
//! one-to-many relations are stored without embedding growing lists.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tangle_storage::{KVStore, MemoryKVStore, ObjectFlags, ObjectStorage, StorableObject, StorageConfig};
//!
//! struct Counter {
//!     name: Vec<u8>,
//!     value: u64,
//!     flags: ObjectFlags,
//! }
//!
//! impl StorableObject for Counter {
//!     type Error = std::array::TryFromSliceError;
//!
//!     fn object_storage_key(&self) -> Vec<u8> { self.name.clone() }
//!     fn object_storage_value(&self) -> Vec<u8> { self.value.to_le_bytes().to_vec() }
//!     fn from_object_storage(key: &[u8], value: &[u8]) -> Result<Self, Self::Error> {
//!         Ok(Counter { name: key.to_vec(), value: u64::from_le_bytes(value.try_into()?), flags: ObjectFlags::new() })
//!     }
//!     fn flags(&self) -> &ObjectFlags { &self.flags }
//! }
//!
//! let backend = Arc::new(MemoryKVStore::new());
//! let storage = ObjectStorage::<Counter>::new(backend.clone(), StorageConfig::new("counters/"));
//! storage.store(Counter { name: b"a".to_vec(), value: 7, flags: ObjectFlags::new() }).unwrap();
//! assert!(backend.is_empty());
//!
//! storage.flush().unwrap();
//! assert_eq!(backend.get(b"counters/a").unwrap(), Some(7u64.to_le_bytes().to_vec()));
//! ```

mod config;
mod error;
mod kvstore;
mod object;
mod storage;

pub use config::StorageConfig;
pub use error::{Result, StorageError};
pub use kvstore::{KVStore, MemoryKVStore};
pub use object::{ObjectFlags, StorableObject};
pub use storage::{FlushStats, ObjectStorage};
