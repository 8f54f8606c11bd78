//! Ledger identifiers.
//!
//! A conflict is named after the output that is spent more than once, so a
//! [`ConflictID`] has exactly the layout of an [`OutputID`]: the creating
//! transaction followed by the output index.

use tangle_core::{define_identifier, Identifiers};

define_identifier! {
    /// Identifier of a ledger transaction.
    pub struct TransactionID([u8; 32]) as "transaction ID";
}

/// Length of an [`OutputID`]: transaction ID followed by a `u16` index.
pub const OUTPUT_ID_LENGTH: usize = TransactionID::LENGTH + 2;

define_identifier! {
    /// Identifier of a transaction output.
    pub struct OutputID([u8; OUTPUT_ID_LENGTH]) as "output ID";
}

impl OutputID {
    /// Build the identifier of output `index` of `transaction_id`.
    pub fn from_transaction(transaction_id: TransactionID, index: u16) -> Self {
        let mut bytes = [0u8; OUTPUT_ID_LENGTH];
        bytes[..TransactionID::LENGTH].copy_from_slice(transaction_id.as_bytes());
        bytes[TransactionID::LENGTH..].copy_from_slice(&index.to_le_bytes());
        OutputID::new(bytes)
    }

    /// The transaction that created the output.
    pub fn transaction_id(&self) -> TransactionID {
        let mut bytes = [0u8; TransactionID::LENGTH];
        bytes.copy_from_slice(&self.as_bytes()[..TransactionID::LENGTH]);
        TransactionID::new(bytes)
    }

    /// Position of the output within its transaction.
    pub fn output_index(&self) -> u16 {
        let bytes = self.as_bytes();
        u16::from_le_bytes([bytes[TransactionID::LENGTH], bytes[TransactionID::LENGTH + 1]])
    }
}

define_identifier! {
    /// Identifier of a branch of the ledger state.
    pub struct BranchID([u8; 32]) as "branch ID";
}

impl BranchID {
    /// Placeholder for a branch that has not been determined yet.
    pub const UNDEFINED: BranchID = BranchID::EMPTY;

    /// The branch holding every non-conflicting part of the ledger.
    pub const MASTER: BranchID = BranchID::new([
        1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0,
    ]);

    /// Conflict branches are named after the transaction that creates them.
    pub fn from_transaction_id(transaction_id: TransactionID) -> Self {
        BranchID::new(*transaction_id.as_bytes())
    }
}

define_identifier! {
    /// Identifier of a conflict set; equal to the ID of the contested output.
    pub struct ConflictID([u8; OUTPUT_ID_LENGTH]) as "conflict ID";
}

impl ConflictID {
    /// Conflict over the given output.
    pub fn from_output_id(output_id: OutputID) -> Self {
        ConflictID::new(*output_id.as_bytes())
    }

    /// The output this conflict is about.
    pub fn output_id(&self) -> OutputID {
        OutputID::new(*self.as_bytes())
    }
}

impl From<OutputID> for ConflictID {
    fn from(output_id: OutputID) -> Self {
        ConflictID::from_output_id(output_id)
    }
}

/// A set of conflict identifiers.
pub type ConflictIDs = Identifiers<ConflictID>;

/// A set of branch identifiers.
pub type BranchIDs = Identifiers<BranchID>;
