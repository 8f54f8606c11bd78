//! Conflict bookkeeping over object storage.

use crate::conflict::Conflict;
use crate::conflict_member::ConflictMember;
use crate::error::Result;
use crate::ids::{BranchID, BranchIDs, ConflictID};
use parking_lot::Mutex;
use std::sync::Arc;
use tangle_storage::{FlushStats, KVStore, ObjectStorage, StorageConfig};
use tracing::debug;

/// Realm of persisted [`Conflict`]s.
pub const CONFLICT_REALM: &str = "conflict/";

/// Realm of persisted [`ConflictMember`] edges.
pub const CONFLICT_MEMBER_REALM: &str = "conflict_member/";

/// Number of locks that serialize membership changes.
const LOCK_STRIPES: usize = 64;

/// Keeps conflicts and their member edges consistent.
///
/// A member edge is stored at most once per (conflict, branch) pair and the
/// conflict's member count changes exactly once for every edge that is
/// created or removed. Changes to the same conflict are serialized, so the
/// count always matches the stored edges once all calls have returned.
pub struct ConflictRegistry {
    conflicts: ObjectStorage<Conflict>,
    members: ObjectStorage<ConflictMember>,
    locks: Vec<Mutex<()>>,
}

impl ConflictRegistry {
    /// Create a registry storing both object kinds in `backend`, separated
    /// by realm.
    pub fn new(backend: Arc<dyn KVStore>) -> Self {
        let conflicts = StorageConfig::new(CONFLICT_REALM).with_key_partition(vec![ConflictID::LENGTH]);
        let members =
            StorageConfig::new(CONFLICT_MEMBER_REALM).with_key_partition(ConflictMember::key_partition());
        Self::with_configs(backend, conflicts, members)
    }

    /// Create a registry with explicit storage configurations.
    pub fn with_configs(
        backend: Arc<dyn KVStore>,
        conflicts: StorageConfig,
        members: StorageConfig,
    ) -> Self {
        ConflictRegistry {
            conflicts: ObjectStorage::new(Arc::clone(&backend), conflicts),
            members: ObjectStorage::new(backend, members),
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    fn lock_for(&self, conflict_id: &ConflictID) -> &Mutex<()> {
        let stripe = conflict_id
            .as_bytes()
            .iter()
            .fold(0usize, |acc, byte| acc.wrapping_mul(31).wrapping_add(*byte as usize));
        &self.locks[stripe % LOCK_STRIPES]
    }

    /// Record that `branch_id` is part of `conflict_id`, creating the
    /// conflict on first use.
    ///
    /// Returns `true` if the edge is new.
    pub fn register_member(&self, conflict_id: ConflictID, branch_id: BranchID) -> Result<bool> {
        let _guard = self.lock_for(&conflict_id).lock();
        let (conflict, created_conflict) = self
            .conflicts
            .compute_if_absent(conflict_id.as_bytes(), || Conflict::new(conflict_id))?;
        if created_conflict {
            debug!(conflict = %conflict_id, "created conflict");
        }

        let key = ConflictMember::storage_key(&conflict_id, &branch_id);
        let (_, created) = self
            .members
            .compute_if_absent(&key, || ConflictMember::new(conflict_id, branch_id))?;
        if created {
            let member_count = conflict.increase_member_count();
            debug!(conflict = %conflict_id, branch = %branch_id, member_count, "registered conflict member");
        }
        Ok(created)
    }

    /// Remove `branch_id` from `conflict_id`.
    ///
    /// Returns `true` if the edge existed.
    pub fn unregister_member(&self, conflict_id: ConflictID, branch_id: BranchID) -> Result<bool> {
        let _guard = self.lock_for(&conflict_id).lock();
        let key = ConflictMember::storage_key(&conflict_id, &branch_id);
        if !self.members.delete(&key)? {
            return Ok(false);
        }

        if let Some(conflict) = self.conflicts.load(conflict_id.as_bytes())? {
            let member_count = conflict.decrease_member_count();
            debug!(conflict = %conflict_id, branch = %branch_id, member_count, "unregistered conflict member");
        }
        Ok(true)
    }

    /// The conflict with the given ID, if it was ever registered.
    pub fn conflict(&self, conflict_id: &ConflictID) -> Result<Option<Arc<Conflict>>> {
        Ok(self.conflicts.load(conflict_id.as_bytes())?)
    }

    /// Current member count of a conflict; zero for unknown conflicts.
    pub fn member_count(&self, conflict_id: &ConflictID) -> Result<u64> {
        Ok(self
            .conflict(conflict_id)?
            .map_or(0, |conflict| conflict.member_count()))
    }

    /// Branches that are members of `conflict_id`.
    pub fn members(&self, conflict_id: &ConflictID) -> Result<BranchIDs> {
        Ok(self
            .members
            .load_by_prefix(conflict_id.as_bytes())?
            .iter()
            .map(|member| member.branch_id())
            .collect())
    }

    /// Persist every modified conflict and member edge.
    pub fn flush(&self) -> Result<FlushStats> {
        let conflicts = self.conflicts.flush()?;
        let members = self.members.flush()?;
        Ok(FlushStats {
            written: conflicts.written + members.written,
            deleted: conflicts.deleted + members.deleted,
        })
    }
}
