//! Error types shared by every decoder in the workspace.

use thiserror::Error;

/// Failure to read a value out of a byte buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to parse {field}: bytes not long enough (need {needed}, have {remaining})")]
    NotEnoughBytes {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("failed to parse bytes: {remaining} trailing bytes after end of object")]
    TrailingBytes { remaining: usize },

    #[error("failed to parse {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ParseError {
    /// Name of the field that could not be read, if the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ParseError::NotEnoughBytes { field, .. } | ParseError::InvalidValue { field, .. } => {
                Some(field)
            }
            ParseError::TrailingBytes { .. } => None,
        }
    }
}

/// Malformed identifier in its binary or text form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("data must be exactly {expected} long to encode a valid {kind} (got {actual})")]
    WrongLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("failed to decode base58 encoded string for {kind}: {reason}")]
    InvalidBase58 { kind: &'static str, reason: String },
}
