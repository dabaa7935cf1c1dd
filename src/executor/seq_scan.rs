//! Sequential table scan operator.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::catalog::Catalog;
use crate::error::{Result, ScanError};
use crate::executor::{OpIterator, ScanConfig, ScanState};
use crate::storage::{DbFile, DbFileIterator};
use crate::transaction::TransactionId;
use crate::types::{TableId, Tuple, TupleDesc};

/// Reads every tuple of one table, in storage order, as part of a transaction.
///
/// Output field names are qualified as `alias.field` so that scans over
/// tables with same-named columns can be joined. Tuples themselves are passed
/// through untouched.
pub struct SeqScan {
    catalog: Arc<Catalog>,
    tid: TransactionId,
    table_id: TableId,
    table_alias: Option<String>,
    config: ScanConfig,
    state: ScanState,
    /// File bound by the last successful open. Kept after close so the
    /// descriptor stays available; dropped when `reset` changes the table.
    file: Option<Arc<dyn DbFile>>,
    /// Present exactly while `state` is `Open`.
    cursor: Option<Box<dyn DbFileIterator>>,
}

impl std::fmt::Debug for SeqScan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeqScan")
            .field("tid", &self.tid)
            .field("table_id", &self.table_id)
            .field("table_alias", &self.table_alias)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SeqScan {
    /// Creates a scan over `table_id` as part of `tid`. No catalog or storage
    /// access happens until [`OpIterator::open`].
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        tid: TransactionId,
        table_id: TableId,
        table_alias: Option<String>,
    ) -> Self {
        SeqScan {
            catalog,
            tid,
            table_id,
            table_alias,
            config: ScanConfig::default(),
            state: ScanState::Unopened,
            file: None,
            cursor: None,
        }
    }

    /// Creates a scan aliased by the table's canonical catalog name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if the catalog has no table with this id.
    pub fn for_table(catalog: Arc<Catalog>, tid: TransactionId, table_id: TableId) -> Result<Self> {
        let name = catalog.table_name(table_id)?;
        Ok(Self::new(catalog, tid, table_id, Some(name)))
    }

    /// Replaces the scan configuration.
    #[must_use]
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the canonical catalog name of the scanned table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if the catalog has no table with this id.
    pub fn table_name(&self) -> Result<String> {
        self.catalog.table_name(self.table_id)
    }

    /// Returns the alias exactly as it was given.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.table_alias.as_deref()
    }

    /// Returns the id of the scanned table.
    #[must_use]
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Returns the transaction this scan reads under.
    #[must_use]
    pub fn transaction_id(&self) -> TransactionId {
        self.tid
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Returns the scan configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Rebinds the scan to another table and alias.
    ///
    /// # Errors
    ///
    /// Returns `IllegalState` if the scan is open; the binding is unchanged.
    pub fn reset(&mut self, table_id: TableId, table_alias: Option<String>) -> Result<()> {
        if self.state == ScanState::Open {
            return Err(self.illegal("reset"));
        }
        if table_id != self.table_id {
            self.file = None;
        }
        debug!(
            from = self.table_id,
            to = table_id,
            alias = table_alias.as_deref(),
            "scan rebound"
        );
        self.table_id = table_id;
        self.table_alias = table_alias;
        Ok(())
    }

    fn prefix(&self) -> &str {
        self.table_alias
            .as_deref()
            .unwrap_or(&self.config.missing_alias)
    }

    fn illegal(&self, operation: &'static str) -> ScanError {
        ScanError::IllegalState {
            operation,
            state: self.state.name(),
        }
    }

    fn bound_cursor(&mut self, operation: &'static str) -> Result<&mut (dyn DbFileIterator + 'static)> {
        let state = self.state.name();
        self.cursor
            .as_deref_mut()
            .ok_or_else(|| ScanError::IllegalState { operation, state })
    }
}

impl OpIterator for SeqScan {
    #[tracing::instrument(skip(self), fields(table_id = self.table_id, tid = %self.tid), level = "debug")]
    fn open(&mut self) -> Result<()> {
        if self.state == ScanState::Open {
            return Err(self.illegal("open"));
        }
        let file = self.catalog.database_file(self.table_id)?;
        let mut cursor = file.iterator(self.tid);
        cursor.open()?;

        self.file = Some(file);
        self.cursor = Some(cursor);
        self.state = ScanState::Open;
        debug!("scan opened");
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        self.bound_cursor("read")?.has_next()
    }

    fn next(&mut self) -> Result<Tuple> {
        let tuple = self.bound_cursor("read")?.next()?;
        trace!(table_id = self.table_id, "tuple produced");
        Ok(tuple)
    }

    fn rewind(&mut self) -> Result<()> {
        self.bound_cursor("rewind")?.rewind()?;
        debug!(table_id = self.table_id, tid = %self.tid, "scan rewound");
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
            self.state = ScanState::Closed;
            debug!(table_id = self.table_id, tid = %self.tid, "scan closed");
        }
    }

    fn tuple_desc(&self) -> Result<TupleDesc> {
        let file = self.file.as_ref().ok_or(ScanError::NotOpened)?;
        Ok(file.tuple_desc().qualified(self.prefix()))
    }
}

impl Drop for SeqScan {
    fn drop(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            warn!(table_id = self.table_id, tid = %self.tid, "scan dropped while open");
            cursor.close();
        }
    }
}
