//! Executor module for pull-based query execution.
//!
//! Every pipeline stage implements [`OpIterator`]: it is opened once, pulled
//! with `has_next`/`next` until exhausted, optionally rewound, and closed.
//! [`SeqScan`] is the leaf stage that reads a table from storage.

mod seq_scan;

use crate::error::Result;
use crate::types::{Tuple, TupleDesc, NULL_NAME};

pub use seq_scan::SeqScan;

/// Configuration for scan operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Prefix used for qualified field names when the scan has no alias.
    pub missing_alias: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            missing_alias: NULL_NAME.to_string(),
        }
    }
}

impl ScanConfig {
    /// Creates a new scan configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefix used when the scan has no alias.
    #[must_use]
    pub fn with_missing_alias(mut self, missing_alias: impl Into<String>) -> Self {
        self.missing_alias = missing_alias.into();
        self
    }
}

/// Lifecycle state of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Constructed but never opened.
    Unopened,
    /// Opened; reads are valid.
    Open,
    /// Closed after having been open.
    Closed,
}

impl ScanState {
    /// Returns a lowercase name for error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ScanState::Unopened => "unopened",
            ScanState::Open => "open",
            ScanState::Closed => "closed",
        }
    }
}

/// Trait for operators in the execution pipeline.
pub trait OpIterator {
    /// Opens the operator. Must be called before any read.
    ///
    /// # Errors
    ///
    /// Returns an error if storage resources cannot be acquired.
    fn open(&mut self) -> Result<()>;

    /// Returns true if `next` would produce a tuple.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if the operator is not open, or a storage error.
    fn has_next(&mut self) -> Result<bool>;

    /// Returns the next tuple.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if the operator is not open, `NoSuchElement`
    /// when exhausted, or a storage error.
    fn next(&mut self) -> Result<Tuple>;

    /// Restarts the operator at its first tuple.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if the operator is not open, or a storage error.
    fn rewind(&mut self) -> Result<()>;

    /// Closes the operator and releases its resources.
    fn close(&mut self);

    /// Returns the schema of the tuples this operator produces.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be determined yet.
    fn tuple_desc(&self) -> Result<TupleDesc>;
}

/// Drains an open operator into a vector.
///
/// # Errors
///
/// Returns the first error the operator reports.
pub fn collect_tuples(op: &mut dyn OpIterator) -> Result<Vec<Tuple>> {
    let mut tuples = Vec::new();
    while op.has_next()? {
        tuples.push(op.next()?);
    }
    Ok(tuples)
}
