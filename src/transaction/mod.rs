//! Transaction identifiers and status tracking.
//!
//! The scan operator never inspects a [`TransactionId`]; it only threads it
//! through to storage. [`TransactionManager`] is the piece storage consults to
//! learn whether the transaction is still allowed to read.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScanError};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque token identifying one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Allocates a fresh, process-unique transaction id.
    #[must_use]
    pub fn new() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

/// Lifecycle status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Running; reads and writes are allowed.
    Active,
    /// Committed; no further storage access is allowed.
    Committed,
    /// Aborted (deadlock victim, timeout, explicit rollback).
    Aborted,
}

/// Tracks the status of transactions for the storage layer.
///
/// Finished transactions keep their entry so that a late read by a committed
/// or aborted id still fails. Call [`TransactionManager::forget`] once no
/// cursor can use an id any more.
#[derive(Debug, Default)]
pub struct TransactionManager {
    statuses: RwLock<HashMap<TransactionId, TransactionStatus>>,
}

impl TransactionManager {
    /// Creates a new manager with no known transactions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new transaction and returns its id.
    pub fn begin(&self) -> TransactionId {
        let tid = TransactionId::new();
        self.statuses.write().insert(tid, TransactionStatus::Active);
        debug!(%tid, "transaction started");
        tid
    }

    /// Marks a transaction as aborted. Any storage access it makes afterwards
    /// fails with [`ScanError::TransactionAborted`].
    pub fn abort(&self, tid: TransactionId) {
        self.statuses.write().insert(tid, TransactionStatus::Aborted);
        debug!(%tid, "transaction aborted");
    }

    /// Marks a transaction as committed.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAborted` if the transaction was already aborted.
    pub fn commit(&self, tid: TransactionId) -> Result<()> {
        let mut statuses = self.statuses.write();
        if statuses.get(&tid) == Some(&TransactionStatus::Aborted) {
            return Err(ScanError::TransactionAborted(tid));
        }
        statuses.insert(tid, TransactionStatus::Committed);
        debug!(%tid, "transaction committed");
        Ok(())
    }

    /// Drops the entry for a finished transaction. Active transactions are
    /// kept. Returns true if an entry was removed.
    pub fn forget(&self, tid: TransactionId) -> bool {
        let mut statuses = self.statuses.write();
        if !matches!(
            statuses.get(&tid),
            Some(TransactionStatus::Committed | TransactionStatus::Aborted)
        ) {
            return false;
        }
        statuses.remove(&tid);
        debug!(%tid, "transaction forgotten");
        true
    }

    /// Returns the number of transactions the manager is tracking.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.read().len()
    }

    /// Returns true if no transactions are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.read().is_empty()
    }

    /// Returns the status of a transaction. Ids the manager has never seen are
    /// reported as active.
    #[must_use]
    pub fn status(&self, tid: TransactionId) -> TransactionStatus {
        self.statuses
            .read()
            .get(&tid)
            .copied()
            .unwrap_or(TransactionStatus::Active)
    }

    /// Fails unless the transaction may still access storage.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAborted` for an aborted transaction and `Database`
    /// for a committed one.
    pub fn check_active(&self, tid: TransactionId) -> Result<()> {
        match self.status(tid) {
            TransactionStatus::Active => Ok(()),
            TransactionStatus::Aborted => Err(ScanError::TransactionAborted(tid)),
            TransactionStatus::Committed => Err(ScanError::Database(format!(
                "Transaction {tid} has already committed"
            ))),
        }
    }
}
