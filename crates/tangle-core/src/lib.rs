//! # tangle-core
//!
//! Shared primitives for the tangle message layer:
//!
//! - Little-endian byte marshalling with field-aware parse errors
//! - Fixed-length identifiers with base58 text forms
//! - Identifier sets with a length-prefixed binary form
//! - BLAKE2b-256 content hashing

mod error;
mod hash;
mod identifier;
mod identifiers;
mod marshal;

pub use error::{IdentifierError, ParseError};
pub use hash::{blake2b_256, DIGEST_LENGTH};
pub use identifier::Identifier;
pub use identifiers::Identifiers;
pub use marshal::{MarshalReader, MarshalWriter};

#[doc(hidden)]
pub mod __private {
    pub use bs58;
    pub use rand;
    pub use serde;
}
