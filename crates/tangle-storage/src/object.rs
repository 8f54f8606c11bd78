//! The contract between stored objects and the object storage.

use std::sync::atomic::{AtomicBool, Ordering};

/// An object that can be persisted as a key/value pair.
///
/// The key identifies the object; the value carries whatever the key does
/// not. `from_object_storage` must accept exactly what the two accessors
/// produce.
pub trait StorableObject: Send + Sync + Sized + 'static {
    /// Error returned when restoring from stored bytes fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Key under which the object is stored.
    fn object_storage_key(&self) -> Vec<u8>;

    /// Value stored under the key.
    fn object_storage_value(&self) -> Vec<u8>;

    /// Rebuild the object from a stored key/value pair.
    fn from_object_storage(key: &[u8], value: &[u8]) -> Result<Self, Self::Error>;

    /// Persistence bookkeeping flags.
    fn flags(&self) -> &ObjectFlags;
}

/// Persistence state of an object held by the storage.
///
/// Objects mark themselves modified whenever their persisted form changes;
/// the storage writes them out on the next flush.
#[derive(Debug, Default)]
pub struct ObjectFlags {
    modified: AtomicBool,
    deleted: AtomicBool,
}

impl ObjectFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::Acquire)
    }

    pub fn set_modified(&self, modified: bool) {
        self.modified.store(modified, Ordering::Release);
    }

    /// Clear the modified flag, returning whether it was set.
    pub fn take_modified(&self) -> bool {
        self.modified.swap(false, Ordering::AcqRel)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    pub fn set_deleted(&self, deleted: bool) {
        self.deleted.store(deleted, Ordering::Release);
    }
}

impl Clone for ObjectFlags {
    fn clone(&self) -> Self {
        ObjectFlags {
            modified: AtomicBool::new(self.is_modified()),
            deleted: AtomicBool::new(self.is_deleted()),
        }
    }
}
