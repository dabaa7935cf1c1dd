//! In-memory table storage with row layout.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::{Result, ScanError};
use crate::storage::{DbFile, DbFileIterator};
use crate::transaction::{TransactionId, TransactionManager};
use crate::types::{TableId, Tuple, TupleDesc};

static NEXT_FILE_ID: AtomicU32 = AtomicU32::new(1);

/// Table whose tuples live in memory, in insertion order.
pub struct MemoryFile {
    id: TableId,
    desc: TupleDesc,
    tuples: Arc<RwLock<Vec<Tuple>>>,
    txns: Arc<TransactionManager>,
}

impl std::fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFile")
            .field("id", &self.id)
            .field("row_count", &self.len())
            .field("column_count", &self.desc.num_fields())
            .finish_non_exhaustive()
    }
}

impl MemoryFile {
    /// Creates a new empty table with the given schema. Storage access is
    /// checked against `txns`.
    #[must_use]
    pub fn new(desc: TupleDesc, txns: Arc<TransactionManager>) -> Self {
        MemoryFile {
            id: NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed),
            desc,
            tuples: Arc::new(RwLock::new(Vec::new())),
            txns,
        }
    }

    /// Appends a tuple as part of `tid`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The transaction is no longer active
    /// - The tuple has the wrong number of fields
    /// - A value has the wrong type
    pub fn insert_tuple(&self, tid: TransactionId, tuple: Tuple) -> Result<()> {
        self.txns.check_active(tid)?;
        self.desc.validate(&tuple)?;
        self.tuples.write().push(tuple);
        Ok(())
    }

    /// Returns the number of stored tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.read().len()
    }

    /// Returns true if the table holds no tuples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.read().is_empty()
    }
}

impl DbFile for MemoryFile {
    fn id(&self) -> TableId {
        self.id
    }

    fn tuple_desc(&self) -> TupleDesc {
        self.desc.clone()
    }

    fn iterator(&self, tid: TransactionId) -> Box<dyn DbFileIterator> {
        Box::new(MemoryFileIterator {
            table_id: self.id,
            tid,
            tuples: Arc::clone(&self.tuples),
            txns: Arc::clone(&self.txns),
            position: None,
        })
    }
}

/// Cursor over a [`MemoryFile`]. `position` is `None` while closed.
struct MemoryFileIterator {
    table_id: TableId,
    tid: TransactionId,
    tuples: Arc<RwLock<Vec<Tuple>>>,
    txns: Arc<TransactionManager>,
    position: Option<usize>,
}

impl MemoryFileIterator {
    fn position(&self) -> Result<usize> {
        self.position.ok_or_else(|| {
            ScanError::Database(format!(
                "Cursor over table {} used before open",
                self.table_id
            ))
        })
    }
}

impl DbFileIterator for MemoryFileIterator {
    fn open(&mut self) -> Result<()> {
        self.txns.check_active(self.tid)?;
        self.position = Some(0);
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        let position = self.position()?;
        self.txns.check_active(self.tid)?;
        Ok(position < self.tuples.read().len())
    }

    fn next(&mut self) -> Result<Tuple> {
        let position = self.position()?;
        self.txns.check_active(self.tid)?;
        let tuple = self
            .tuples
            .read()
            .get(position)
            .cloned()
            .ok_or(ScanError::NoSuchElement)?;
        self.position = Some(position + 1);
        trace!(table_id = self.table_id, position, "tuple read");
        Ok(tuple)
    }

    fn rewind(&mut self) -> Result<()> {
        self.position()?;
        self.txns.check_active(self.tid)?;
        self.position = Some(0);
        Ok(())
    }

    fn close(&mut self) {
        self.position = None;
    }
}
