//! Message identifiers.

use tangle_core::{define_identifier, Identifiers};

define_identifier! {
    /// Identifier of a message: the BLAKE2b-256 digest of its bytes.
    pub struct MessageID([u8; 32]) as "message ID";
}

/// The all-zero message ID, referenced by genesis messages.
pub const EMPTY_MESSAGE_ID: MessageID = MessageID::EMPTY;

/// A set of message identifiers.
pub type MessageIDs = Identifiers<MessageID>;
