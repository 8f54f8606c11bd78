//! Error types for the ledger state.

use tangle_storage::StorageError;
use thiserror::Error;

/// Errors that can occur in ledger state bookkeeping.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
