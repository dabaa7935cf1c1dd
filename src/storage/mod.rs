//! Storage collaborator interfaces.
//!
//! A [`DbFile`] is the physical storage handle for one table; it hands out
//! [`DbFileIterator`] cursors scoped to a transaction. The scan operator only
//! talks to these traits. [`MemoryFile`] is an in-memory implementation.

mod memory;

pub use memory::MemoryFile;

use crate::error::Result;
use crate::transaction::TransactionId;
use crate::types::{TableId, Tuple, TupleDesc};

/// Physical storage for the tuples of one table.
pub trait DbFile: Send + Sync + std::fmt::Debug {
    /// Returns the id the catalog registers this file under.
    fn id(&self) -> TableId;

    /// Returns the raw (unqualified) schema of the stored tuples.
    fn tuple_desc(&self) -> TupleDesc;

    /// Creates a cursor over every tuple, reading as part of `tid`.
    ///
    /// The cursor is returned closed; call [`DbFileIterator::open`] first.
    fn iterator(&self, tid: TransactionId) -> Box<dyn DbFileIterator>;
}

/// Transaction-scoped sequential reader over one table's tuples.
pub trait DbFileIterator: Send {
    /// Positions the cursor before the first tuple.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAborted` if the transaction was aborted, or a
    /// `Database` error for any other storage failure.
    fn open(&mut self) -> Result<()>;

    /// Returns true if another tuple is available.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAborted` or `Database` errors from storage.
    fn has_next(&mut self) -> Result<bool>;

    /// Returns the next tuple.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchElement` when the cursor is exhausted, plus any error
    /// [`DbFileIterator::has_next`] can return.
    fn next(&mut self) -> Result<Tuple>;

    /// Restarts iteration at the first tuple.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAborted` or `Database` errors from storage.
    fn rewind(&mut self) -> Result<()>;

    /// Releases the cursor. Reads after close fail until reopened.
    fn close(&mut self);
}
