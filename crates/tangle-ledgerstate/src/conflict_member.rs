//! Membership edges between conflicts and branches.

use crate::ids::{BranchID, ConflictID};
use std::fmt;
use tangle_core::{MarshalReader, ParseError};
use tangle_storage::{ObjectFlags, StorableObject};

/// Records that a branch is part of a conflict.
///
/// The storage key is `conflictID ⧺ branchID`, so all members of a conflict
/// share the conflict ID as key prefix and can be found with a prefix scan.
/// The value is empty.
#[derive(Debug, Clone)]
pub struct ConflictMember {
    conflict_id: ConflictID,
    branch_id: BranchID,
    flags: ObjectFlags,
}

impl ConflictMember {
    /// Length of the storage key.
    pub const KEY_LENGTH: usize = ConflictID::LENGTH + BranchID::LENGTH;

    pub fn new(conflict_id: ConflictID, branch_id: BranchID) -> Self {
        ConflictMember {
            conflict_id,
            branch_id,
            flags: ObjectFlags::new(),
        }
    }

    pub fn conflict_id(&self) -> ConflictID {
        self.conflict_id
    }

    pub fn branch_id(&self) -> BranchID {
        self.branch_id
    }

    /// Lengths of the key components, in key order.
    pub fn key_partition() -> Vec<usize> {
        vec![ConflictID::LENGTH, BranchID::LENGTH]
    }

    /// Key of the member edge between `conflict_id` and `branch_id`.
    pub fn storage_key(conflict_id: &ConflictID, branch_id: &BranchID) -> Vec<u8> {
        let mut key = Vec::with_capacity(Self::KEY_LENGTH);
        key.extend_from_slice(conflict_id.as_bytes());
        key.extend_from_slice(branch_id.as_bytes());
        key
    }

    /// Full encoding; identical to the storage key.
    pub fn bytes(&self) -> Vec<u8> {
        Self::storage_key(&self.conflict_id, &self.branch_id)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = MarshalReader::new(bytes);
        let member = Self::from_marshal(&mut reader)?;
        reader.finish()?;
        Ok(member)
    }

    pub fn from_marshal(reader: &mut MarshalReader<'_>) -> Result<Self, ParseError> {
        let conflict_id = ConflictID::from_marshal(reader)?;
        let branch_id = BranchID::from_marshal(reader)?;
        Ok(ConflictMember::new(conflict_id, branch_id))
    }
}

impl StorableObject for ConflictMember {
    type Error = ParseError;

    fn object_storage_key(&self) -> Vec<u8> {
        self.bytes()
    }

    fn object_storage_value(&self) -> Vec<u8> {
        Vec::new()
    }

    fn from_object_storage(key: &[u8], value: &[u8]) -> Result<Self, Self::Error> {
        if !value.is_empty() {
            return Err(ParseError::TrailingBytes {
                remaining: value.len(),
            });
        }
        Self::from_bytes(key)
    }

    fn flags(&self) -> &ObjectFlags {
        &self.flags
    }
}

impl PartialEq for ConflictMember {
    fn eq(&self, other: &Self) -> bool {
        self.conflict_id == other.conflict_id && self.branch_id == other.branch_id
    }
}

impl Eq for ConflictMember {}

impl fmt::Display for ConflictMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConflictMember {{ conflict_id: {}, branch_id: {} }}",
            self.conflict_id, self.branch_id
        )
    }
}
