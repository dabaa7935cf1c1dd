//! Table registry mapping table ids to names and storage handles.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::storage::DbFile;
use crate::types::{TableId, TupleDesc};

/// Metadata snapshot of one registered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table ID (the id of its storage file).
    pub table_id: TableId,
    /// Canonical table name.
    pub name: String,
    /// Name of the primary key field, empty if none.
    pub primary_key: String,
    /// Raw schema of the stored tuples.
    pub tuple_desc: TupleDesc,
}

struct TableEntry {
    name: String,
    primary_key: String,
    file: Arc<dyn DbFile>,
}

#[derive(Default)]
struct Tables {
    by_id: HashMap<TableId, TableEntry>,
    by_name: HashMap<String, TableId>,
}

/// Central registry of all tables in the database.
///
/// Shared between operators as `Arc<Catalog>`; lookups take a read lock.
#[derive(Default)]
pub struct Catalog {
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("table_count", &self.tables.read().by_id.len())
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table under the id of its storage file.
    ///
    /// A previous table with the same name or the same id is replaced.
    pub fn add_table(&self, file: Arc<dyn DbFile>, name: &str, primary_key: &str) -> TableId {
        let table_id = file.id();
        let mut tables = self.tables.write();

        if let Some(old_id) = tables.by_name.remove(name) {
            tables.by_id.remove(&old_id);
        }
        if let Some(old) = tables.by_id.remove(&table_id) {
            tables.by_name.remove(&old.name);
        }

        tables.by_name.insert(name.to_string(), table_id);
        tables.by_id.insert(
            table_id,
            TableEntry {
                name: name.to_string(),
                primary_key: primary_key.to_string(),
                file,
            },
        );
        debug!(table_id, name, "table registered");
        table_id
    }

    /// Returns the canonical name of a table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if no table has this id.
    pub fn table_name(&self, table_id: TableId) -> Result<String> {
        self.with_entry(table_id, |entry| entry.name.clone())
    }

    /// Returns the storage handle of a table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if no table has this id.
    pub fn database_file(&self, table_id: TableId) -> Result<Arc<dyn DbFile>> {
        self.with_entry(table_id, |entry| Arc::clone(&entry.file))
    }

    /// Returns the raw schema of a table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if no table has this id.
    pub fn tuple_desc(&self, table_id: TableId) -> Result<TupleDesc> {
        self.with_entry(table_id, |entry| entry.file.tuple_desc())
    }

    /// Returns the primary key field name of a table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if no table has this id.
    pub fn primary_key(&self, table_id: TableId) -> Result<String> {
        self.with_entry(table_id, |entry| entry.primary_key.clone())
    }

    /// Finds a table id by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTableName` if no table has this name.
    pub fn table_id(&self, name: &str) -> Result<TableId> {
        self.tables
            .read()
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| ScanError::UnknownTableName(name.to_string()))
    }

    /// Returns a metadata snapshot of a table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTable` if no table has this id.
    pub fn table_info(&self, table_id: TableId) -> Result<TableInfo> {
        self.with_entry(table_id, |entry| TableInfo {
            table_id,
            name: entry.name.clone(),
            primary_key: entry.primary_key.clone(),
            tuple_desc: entry.file.tuple_desc(),
        })
    }

    /// Returns all registered table ids in ascending order.
    #[must_use]
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.tables.read().by_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Removes every table.
    pub fn clear(&self) {
        let mut tables = self.tables.write();
        tables.by_id.clear();
        tables.by_name.clear();
    }

    fn with_entry<T>(&self, table_id: TableId, f: impl FnOnce(&TableEntry) -> T) -> Result<T> {
        self.tables
            .read()
            .by_id
            .get(&table_id)
            .map(f)
            .ok_or(ScanError::UnknownTable(table_id))
    }
}
