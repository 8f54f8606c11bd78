//! # tangle-message
//!
//! Messages are the vertices of the tangle. Each one references earlier
//! messages through typed parents blocks, carries an opaque payload, is
//! signed by its issuer and is identified by the hash of its bytes.
//!
//! - [`ParentsType`], [`ParentsBlock`], [`ParentMessageIDs`] and
//!   [`validate_parents_blocks`] model the references and their rules
//! - [`Message`] holds a validated message together with its canonical
//!   encoding; [`Message::from_bytes`] checks every rule again
//! - [`MessageBuilder`] assembles and signs messages on the issuer side
//!
//! ## Example
//!
//! ```rust
//! use tangle_message::{KeyPair, Message, MessageBuilder, Payload, EMPTY_MESSAGE_ID};
//!
//! let key_pair = KeyPair::generate();
//! let message = MessageBuilder::new()
//!     .with_strong_parent(EMPTY_MESSAGE_ID)
//!     .with_payload(Payload::generic_data(b"hello".to_vec()))
//!     .build_signed(&key_pair)
//!     .unwrap();
//!
//! let received = Message::from_bytes(message.bytes()).unwrap();
//! assert_eq!(received.id(), message.id());
//! assert!(received.verify_signature());
//! ```

mod builder;
mod error;
mod ids;
mod message;
mod parents;
mod payload;
mod signature;

pub use builder::MessageBuilder;
pub use error::{MessageError, Result, ValidationError};
pub use ids::{MessageID, MessageIDs, EMPTY_MESSAGE_ID};
pub use message::{Message, MAX_MESSAGE_SIZE, MAX_PAYLOAD_SIZE, MESSAGE_OVERHEAD, MESSAGE_VERSION};
pub use parents::{
    validate_parents_blocks, ParentMessageIDs, ParentsBlock, ParentsType, MAX_PARENTS_BLOCK_COUNT,
    MAX_PARENTS_COUNT, MAX_REFERENCES, MIN_PARENTS_BLOCK_COUNT, MIN_PARENTS_COUNT,
};
pub use payload::{Payload, PayloadType};
pub use signature::{Ed25519, KeyPair, PublicKey, Signature, SignatureVerifier, Signer};
