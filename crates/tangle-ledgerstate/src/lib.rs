//! # tangle-ledgerstate
//!
//! Conflict sets of the ledger state.
//!
//! When an output is spent by more than one transaction, every spending
//! branch becomes a member of the conflict named after that output. This
//! crate provides the identifiers involved, the [`Conflict`] counter with
//! its [`ConflictMember`] edges, and a [`ConflictRegistry`] that keeps the
//! two consistent on top of `tangle-storage`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tangle_ledgerstate::{BranchID, ConflictID, ConflictRegistry, OutputID, TransactionID};
//! use tangle_storage::MemoryKVStore;
//!
//! let registry = ConflictRegistry::new(Arc::new(MemoryKVStore::new()));
//! let conflict = ConflictID::from_output_id(OutputID::from_transaction(TransactionID::random(), 0));
//!
//! registry.register_member(conflict, BranchID::random()).unwrap();
//! registry.register_member(conflict, BranchID::random()).unwrap();
//! assert_eq!(registry.member_count(&conflict).unwrap(), 2);
//! assert_eq!(registry.members(&conflict).unwrap().len(), 2);
//! ```

mod conflict;
mod conflict_member;
mod error;
mod ids;
mod registry;

pub use conflict::Conflict;
pub use conflict_member::ConflictMember;
pub use error::{LedgerError, Result};
pub use ids::{BranchID, BranchIDs, ConflictID, ConflictIDs, OutputID, TransactionID, OUTPUT_ID_LENGTH};
pub use registry::{ConflictRegistry, CONFLICT_MEMBER_REALM, CONFLICT_REALM};
