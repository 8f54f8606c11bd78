//! Conflict sets.
//!
//! A [`Conflict`] counts the branches that currently contend over one spent
//! output. The members themselves are stored as separate
//! [`ConflictMember`](crate::ConflictMember) edges, so a conflict stays a
//! fixed-size object no matter how often its output is double spent.

use crate::ids::ConflictID;
use parking_lot::RwLock;
use std::fmt;
use tangle_core::{MarshalReader, MarshalWriter, ParseError};
use tangle_storage::{ObjectFlags, StorableObject};
use tracing::{trace, warn};

/// A set of mutually exclusive branches competing over one output.
///
/// The member count is the only mutable state; it is guarded by a
/// read/write lock and every change marks the object modified so the
/// storage persists it on its next flush.
#[derive(Debug)]
pub struct Conflict {
    id: ConflictID,
    member_count: RwLock<u64>,
    flags: ObjectFlags,
}

impl Conflict {
    /// Create a conflict without members.
    pub fn new(id: ConflictID) -> Self {
        Conflict {
            id,
            member_count: RwLock::new(0),
            flags: ObjectFlags::new(),
        }
    }

    pub fn id(&self) -> ConflictID {
        self.id
    }

    /// Number of branches that are part of this conflict.
    pub fn member_count(&self) -> u64 {
        *self.member_count.read()
    }

    /// Add one member. Returns the new count.
    pub fn increase_member_count(&self) -> u64 {
        self.increase_member_count_by(1)
    }

    /// Add `delta` members. Returns the new count.
    pub fn increase_member_count_by(&self, delta: u64) -> u64 {
        let mut count = self.member_count.write();
        *count = count.saturating_add(delta);
        self.flags.set_modified(true);
        trace!(conflict = %self.id, delta, member_count = *count, "increased member count");
        *count
    }

    /// Remove one member. Returns the new count.
    pub fn decrease_member_count(&self) -> u64 {
        self.decrease_member_count_by(1)
    }

    /// Remove `delta` members. Returns the new count, which never drops
    /// below zero.
    pub fn decrease_member_count_by(&self, delta: u64) -> u64 {
        let mut count = self.member_count.write();
        if delta > *count {
            warn!(
                conflict = %self.id,
                delta,
                member_count = *count,
                "member count decrease below zero"
            );
        }
        *count = count.saturating_sub(delta);
        self.flags.set_modified(true);
        trace!(conflict = %self.id, delta, member_count = *count, "decreased member count");
        *count
    }

    /// Full encoding: `conflictID ⧺ memberCount:u64`.
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = self.object_storage_key();
        bytes.extend_from_slice(&self.object_storage_value());
        bytes
    }

    /// Decode the full encoding produced by [`Conflict::bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = MarshalReader::new(bytes);
        let conflict = Self::from_marshal(&mut reader)?;
        reader.finish()?;
        Ok(conflict)
    }

    pub fn from_marshal(reader: &mut MarshalReader<'_>) -> Result<Self, ParseError> {
        let id = ConflictID::from_marshal(reader)?;
        let member_count = reader.read_u64("member count")?;
        Ok(Conflict {
            id,
            member_count: RwLock::new(member_count),
            flags: ObjectFlags::new(),
        })
    }
}

impl StorableObject for Conflict {
    type Error = ParseError;

    fn object_storage_key(&self) -> Vec<u8> {
        self.id.to_vec()
    }

    /// The ID is carried by the key, so the value is just the count.
    fn object_storage_value(&self) -> Vec<u8> {
        let mut writer = MarshalWriter::with_capacity(8);
        writer.write_u64(self.member_count());
        writer.into_bytes()
    }

    fn from_object_storage(key: &[u8], value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(&[key, value].concat())
    }

    fn flags(&self) -> &ObjectFlags {
        &self.flags
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conflict {{ id: {}, member_count: {} }}",
            self.id,
            self.member_count()
        )
    }
}
