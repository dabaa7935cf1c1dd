//! Error types for table-scan operations.

use thiserror::Error;

use crate::transaction::TransactionId;
use crate::types::TableId;

/// Result type alias using [`ScanError`].
pub type Result<T> = std::result::Result<T, ScanError>;

/// Error types surfaced by the scan operator and its collaborators.
#[derive(Debug, Error)]
pub enum ScanError {
    // ==================== Catalog Errors ====================
    /// The catalog has no table with the given id.
    #[error("Unknown table: no table with id {0} in the catalog")]
    UnknownTable(TableId),

    /// The catalog has no table with the given name.
    #[error("Unknown table: no table named '{0}' in the catalog")]
    UnknownTableName(String),

    // ==================== Storage Errors ====================
    /// The transaction the scan runs under was aborted (deadlock, timeout).
    #[error("Transaction {0} was aborted")]
    TransactionAborted(TransactionId),

    /// Any other storage-level failure.
    #[error("Database error: {0}")]
    Database(String),

    /// `next()` was called on an exhausted cursor.
    #[error("No such element: the scan has no more tuples")]
    NoSuchElement,

    /// Tuple arity does not match the table descriptor.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Value type does not match the table descriptor.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeError { expected: String, actual: String },

    // ==================== Caller-State Errors ====================
    /// An operation was invoked in a state that does not allow it.
    #[error("Illegal state: cannot {operation} while the scan is {state}")]
    IllegalState {
        operation: &'static str,
        state: &'static str,
    },

    /// The schema descriptor was requested before the scan was ever opened.
    #[error("Illegal state: the scan has not been opened yet")]
    NotOpened,
}

impl ScanError {
    /// Returns true for errors that indicate a bug in the calling pipeline
    /// rather than a runtime condition.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ScanError::IllegalState { .. } | ScanError::NotOpened)
    }

    /// Returns true if the error means the enclosing transaction must be
    /// rolled back by the executor.
    #[must_use]
    pub fn is_transaction_aborted(&self) -> bool {
        matches!(self, ScanError::TransactionAborted(_))
    }
}
