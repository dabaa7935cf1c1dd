//! seqscan - sequential table scans for pull-based query execution.
//!
//! The crate provides [`SeqScan`], the leaf operator of a Volcano-style
//! pipeline. A scan is bound to a table id, an optional alias, and a
//! transaction; once opened it yields the table's tuples in storage order
//! and describes them with field names qualified as `alias.field`.
//!
//! ```
//! use std::sync::Arc;
//!
//! use seqscan::catalog::Catalog;
//! use seqscan::executor::{collect_tuples, OpIterator, SeqScan};
//! use seqscan::storage::MemoryFile;
//! use seqscan::transaction::TransactionManager;
//! use seqscan::types::{DataType, Tuple, TupleDesc, Value};
//!
//! let txns = Arc::new(TransactionManager::new());
//! let desc = TupleDesc::from_parts(&[DataType::Int64, DataType::String], &["id", "name"])?;
//! let file = Arc::new(MemoryFile::new(desc, Arc::clone(&txns)));
//! let tid = txns.begin();
//! file.insert_tuple(tid, Tuple::new(vec![Value::Int64(1), Value::from("a")]))?;
//!
//! let catalog = Arc::new(Catalog::new());
//! let table_id = catalog.add_table(file, "T", "id");
//!
//! let mut scan = SeqScan::new(catalog, tid, table_id, Some("t".to_string()));
//! scan.open()?;
//! assert_eq!(scan.tuple_desc()?.field_name(0), Some("t.id"));
//! assert_eq!(collect_tuples(&mut scan)?.len(), 1);
//! scan.close();
//! # Ok::<(), seqscan::ScanError>(())
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod storage;
pub mod transaction;
pub mod types;

pub use error::{Result, ScanError};
pub use executor::{OpIterator, ScanConfig, ScanState, SeqScan};
pub use transaction::TransactionId;
pub use types::{TableId, Tuple, TupleDesc, Value};
