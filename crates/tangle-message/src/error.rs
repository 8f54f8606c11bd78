//! Error types for message construction and decoding.

use crate::parents::ParentsType;
use crate::MessageID;
use tangle_core::{IdentifierError, ParseError};
use thiserror::Error;

/// A structural rule on the parents blocks of a message was violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("message has no strong parents")]
    NoStrongParents,

    #[error("{parents_type} parents count {count} out of range")]
    ParentsCountOutOfRange { parents_type: ParentsType, count: usize },

    #[error("blocks not ordered by type: {current} block after {previous} block")]
    BlocksNotOrderedByType {
        previous: ParentsType,
        current: ParentsType,
    },

    #[error("repeating {0} block type")]
    RepeatingBlockType(ParentsType),

    #[error("block type {0} is unknown")]
    UnknownBlockType(u8),

    #[error("{parents_type} parents are not lexicographically ordered")]
    NotLexicographicallyOrdered { parents_type: ParentsType },

    #[error("repeating reference {reference} in {parents_type} block")]
    RepeatingReferenceInBlock {
        parents_type: ParentsType,
        reference: MessageID,
    },

    #[error("reference {reference} appears in both {first} and {second} blocks")]
    ConflictingReferenceAcrossBlocks {
        reference: MessageID,
        first: ParentsType,
        second: ParentsType,
    },

    #[error("message references {count} distinct parents, at most {max} allowed")]
    TooManyReferences { count: usize, max: usize },
}

/// Errors that can occur while building, decoding or restoring a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("message size {size} exceeds maximum of {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("payload size {size} exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("issuing time cannot be represented as nanoseconds since the unix epoch")]
    IssuingTimeOutOfRange,

    #[error("stored message ID {stored} does not match computed ID {computed}")]
    IdMismatch { stored: MessageID, computed: MessageID },
}

impl MessageError {
    /// Whether the bytes could not be read at all, as opposed to describing
    /// a message that breaks a structural rule.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, MessageError::Parse(_) | MessageError::Identifier(_))
    }

    /// The structural rule that was violated, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            MessageError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
