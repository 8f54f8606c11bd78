//! Error types for the storage layer.

use thiserror::Error;

/// Errors that can occur while persisting or restoring objects.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("failed to restore object stored under key {key}")]
    Restore {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid storage configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Hex rendering of a storage key for error messages.
pub(crate) fn key_to_hex(key: &[u8]) -> String {
    key.iter().map(|b| format!("{:02x}", b)).collect()
}
