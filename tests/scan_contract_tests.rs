//! Contract tests for the sequential scan operator.
//!
//! These tests drive `SeqScan` purely through the public API, the way an
//! executor would: build a catalog, open a scan under a transaction, pull
//! tuples, rewind, close.

use std::collections::HashSet;
use std::sync::Arc;

use seqscan::catalog::Catalog;
use seqscan::executor::collect_tuples;
use seqscan::storage::MemoryFile;
use seqscan::transaction::TransactionManager;
use seqscan::types::{DataType, TableId, Tuple, TupleDesc, Value};
use seqscan::{OpIterator, ScanError, ScanState, SeqScan};

struct TestDb {
    catalog: Arc<Catalog>,
    txns: Arc<TransactionManager>,
}

impl TestDb {
    fn new() -> Self {
        TestDb {
            catalog: Arc::new(Catalog::new()),
            txns: Arc::new(TransactionManager::new()),
        }
    }

    /// Creates a table with schema (id INT64, name STRING) and `rows`.
    fn create_table(&self, name: &str, rows: &[(i64, &str)]) -> TableId {
        let desc =
            TupleDesc::from_parts(&[DataType::Int64, DataType::String], &["id", "name"]).unwrap();
        let file = Arc::new(MemoryFile::new(desc, Arc::clone(&self.txns)));
        let loader = self.txns.begin();
        for (id, value) in rows {
            file.insert_tuple(loader, row(*id, value)).unwrap();
        }
        self.txns.commit(loader).unwrap();
        self.catalog.add_table(file, name, "id")
    }

    fn scan(&self, table_id: TableId, alias: Option<&str>) -> SeqScan {
        SeqScan::new(
            Arc::clone(&self.catalog),
            self.txns.begin(),
            table_id,
            alias.map(str::to_string),
        )
    }
}

fn row(id: i64, name: &str) -> Tuple {
    Tuple::new(vec![Value::Int64(id), Value::from(name)])
}

fn field_names(desc: &TupleDesc) -> Vec<String> {
    desc.iter().map(|f| f.display_name().to_string()).collect()
}

// =============================================================================
// Concrete scenario
// =============================================================================

#[test]
fn test_three_row_table_scenario() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[(1, "a"), (2, "b"), (3, "c")]);
    let expected = vec![row(1, "a"), row(2, "b"), row(3, "c")];

    let mut scan = db.scan(table_id, Some("t"));
    scan.open().unwrap();
    assert_eq!(field_names(&scan.tuple_desc().unwrap()), vec!["t.id", "t.name"]);

    assert_eq!(collect_tuples(&mut scan).unwrap(), expected);

    scan.rewind().unwrap();
    assert_eq!(collect_tuples(&mut scan).unwrap(), expected);

    scan.close();
    let err = scan.has_next().unwrap_err();
    assert!(err.is_caller_error(), "expected caller-state error, got {err}");
}

// =============================================================================
// Lifecycle contracts
// =============================================================================

#[test]
fn test_reads_before_open_never_reach_storage() {
    let db = TestDb::new();
    // Unknown table: a storage lookup would fail with UnknownTable.
    let mut scan = db.scan(9999, Some("t"));
    assert!(matches!(
        scan.has_next(),
        Err(ScanError::IllegalState {
            operation: "read",
            state: "unopened"
        })
    ));
    assert!(scan.next().unwrap_err().is_caller_error());
}

#[test]
fn test_open_unknown_table() {
    let db = TestDb::new();
    let mut scan = db.scan(9999, Some("t"));
    assert!(matches!(scan.open(), Err(ScanError::UnknownTable(9999))));
    assert_eq!(scan.state(), ScanState::Unopened);
}

#[test]
fn test_table_name_stable_across_cycles() {
    let db = TestDb::new();
    let table_id = db.create_table("Person", &[(1, "a")]);
    let mut scan = db.scan(table_id, Some("p"));
    let before = scan.table_name().unwrap();
    for _ in 0..3 {
        scan.open().unwrap();
        assert_eq!(scan.table_name().unwrap(), before);
        scan.close();
    }
    assert_eq!(scan.table_name().unwrap(), "Person");
}

#[test]
fn test_reset_between_tables() {
    let db = TestDb::new();
    let people = db.create_table("Person", &[(1, "ann"), (2, "bob")]);
    let cities = db.create_table("City", &[(10, "oslo")]);

    let mut scan = db.scan(people, Some("p"));
    scan.open().unwrap();
    assert_eq!(collect_tuples(&mut scan).unwrap().len(), 2);
    scan.close();

    scan.reset(cities, Some("c".into())).unwrap();
    assert_eq!(scan.table_name().unwrap(), "City");
    scan.open().unwrap();
    assert_eq!(field_names(&scan.tuple_desc().unwrap()), vec!["c.id", "c.name"]);
    assert_eq!(collect_tuples(&mut scan).unwrap(), vec![row(10, "oslo")]);
    scan.close();
}

#[test]
fn test_same_named_columns_disambiguated_by_alias() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[(1, "a")]);
    let mut left = db.scan(table_id, Some("l"));
    let mut right = db.scan(table_id, Some("r"));
    left.open().unwrap();
    right.open().unwrap();

    let mut names: HashSet<String> = field_names(&left.tuple_desc().unwrap()).into_iter().collect();
    for name in field_names(&right.tuple_desc().unwrap()) {
        assert!(names.insert(name), "duplicate qualified name");
    }
    left.close();
    right.close();
}

#[test]
fn test_scan_without_alias_keeps_null_prefix() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[]);
    let mut scan = db.scan(table_id, None);
    assert_eq!(scan.alias(), None);
    scan.open().unwrap();
    assert_eq!(field_names(&scan.tuple_desc().unwrap()), vec!["null.id", "null.name"]);
    assert!(!scan.has_next().unwrap());
    assert!(matches!(scan.next(), Err(ScanError::NoSuchElement)));
}

#[test]
fn test_tuples_not_aliased() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[(5, "e")]);
    let mut scan = db.scan(table_id, Some("t"));
    scan.open().unwrap();
    let tuple = scan.next().unwrap();
    assert_eq!(tuple, row(5, "e"));
}

#[test]
fn test_boxed_operator_pipeline() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[(1, "a"), (2, "b")]);
    let mut op: Box<dyn OpIterator> = Box::new(db.scan(table_id, Some("t")));
    op.open().unwrap();
    assert_eq!(collect_tuples(op.as_mut()).unwrap().len(), 2);
    op.close();
}

#[test]
fn test_scan_on_worker_thread() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[(1, "a"), (2, "b"), (3, "c")]);
    let mut scan = db.scan(table_id, Some("t"));
    let count = std::thread::spawn(move || {
        scan.open().unwrap();
        let n = collect_tuples(&mut scan).unwrap().len();
        scan.close();
        n
    })
    .join()
    .unwrap();
    assert_eq!(count, 3);
}

// =============================================================================
// Transaction contracts
// =============================================================================

#[test]
fn test_concurrent_abort_surfaces_mid_scan() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[(1, "a"), (2, "b")]);
    let mut scan = db.scan(table_id, Some("t"));
    scan.open().unwrap();
    assert_eq!(scan.next().unwrap(), row(1, "a"));

    let txns = Arc::clone(&db.txns);
    let tid = scan.transaction_id();
    std::thread::spawn(move || txns.abort(tid)).join().unwrap();

    let err = scan.next().unwrap_err();
    assert!(matches!(err, ScanError::TransactionAborted(id) if id == tid));
    scan.close();
    assert_eq!(scan.state(), ScanState::Closed);
}

#[test]
fn test_committed_transaction_read_is_database_error() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[(1, "a")]);
    let mut scan = db.scan(table_id, Some("t"));
    db.txns.commit(scan.transaction_id()).unwrap();

    let err = scan.open().unwrap_err();
    assert!(matches!(err, ScanError::Database(_)), "got {err}");
    assert!(!err.is_caller_error());
    assert!(!err.is_transaction_aborted());
    assert_eq!(scan.state(), ScanState::Unopened);
}

#[test]
fn test_commit_mid_scan_surfaces_database_error() {
    let db = TestDb::new();
    let table_id = db.create_table("T", &[(1, "a"), (2, "b")]);
    let mut scan = db.scan(table_id, Some("t"));
    scan.open().unwrap();
    assert_eq!(scan.next().unwrap(), row(1, "a"));

    db.txns.commit(scan.transaction_id()).unwrap();
    let err = scan.next().unwrap_err();
    assert!(matches!(err, ScanError::Database(_)), "got {err}");
    assert!(!err.is_caller_error());
    scan.close();
}

#[test]
fn test_scan_sees_rows_inserted_before_open() {
    let db = TestDb::new();
    let desc = TupleDesc::from_parts(&[DataType::Int64], &["n"]).unwrap();
    let file = Arc::new(MemoryFile::new(desc, Arc::clone(&db.txns)));
    let table_id = db.catalog.add_table(file.clone(), "N", "n");

    let tid = db.txns.begin();
    for n in 0..10 {
        file.insert_tuple(tid, Tuple::new(vec![Value::Int64(n)])).unwrap();
    }
    let mut scan = SeqScan::for_table(Arc::clone(&db.catalog), tid, table_id).unwrap();
    assert_eq!(scan.alias(), Some("N"));
    scan.open().unwrap();
    assert_eq!(collect_tuples(&mut scan).unwrap().len(), 10);
    scan.close();
}

// =============================================================================
// Property-based contracts
// =============================================================================

mod proptest_scan {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Property: a full scan returns every row exactly once, in order.
        #[test]
        fn test_scan_is_exhaustive(ids in proptest::collection::hash_set(any::<i64>(), 0..64)) {
            let db = TestDb::new();
            let rows: Vec<(i64, String)> = ids.iter().map(|id| (*id, format!("row{id}"))).collect();
            let borrowed: Vec<(i64, &str)> = rows.iter().map(|(id, n)| (*id, n.as_str())).collect();
            let table_id = db.create_table("T", &borrowed);

            let mut scan = db.scan(table_id, Some("t"));
            scan.open().unwrap();
            let tuples = collect_tuples(&mut scan).unwrap();
            prop_assert_eq!(tuples.len(), rows.len());
            let expected: Vec<Tuple> = borrowed.iter().map(|(id, n)| row(*id, n)).collect();
            prop_assert_eq!(&tuples, &expected);

            // Rewind after partial consumption restarts from the first tuple.
            if !expected.is_empty() {
                scan.rewind().unwrap();
                scan.next().unwrap();
                scan.rewind().unwrap();
                prop_assert_eq!(scan.next().unwrap(), expected[0].clone());
            }
            scan.close();
        }

        /// Property: every qualified name is `alias.field`, types unchanged.
        #[test]
        fn test_descriptor_qualification(alias in "[a-z][a-z0-9_]{0,8}") {
            let db = TestDb::new();
            let table_id = db.create_table("T", &[]);
            let mut scan = db.scan(table_id, Some(alias.as_str()));
            scan.open().unwrap();
            let desc = scan.tuple_desc().unwrap();
            prop_assert_eq!(desc.num_fields(), 2);
            prop_assert_eq!(desc.field_name(0).unwrap(), format!("{alias}.id"));
            prop_assert_eq!(desc.field_name(1).unwrap(), format!("{alias}.name"));
            prop_assert_eq!(desc.field_type(0), Some(DataType::Int64));
            prop_assert_eq!(desc.field_type(1), Some(DataType::String));
            scan.close();
        }

        /// Property: repeated has_next calls never advance the cursor.
        #[test]
        fn test_has_next_idempotent(calls in 1usize..10) {
            let db = TestDb::new();
            let table_id = db.create_table("T", &[(1, "a"), (2, "b")]);
            let mut scan = db.scan(table_id, Some("t"));
            scan.open().unwrap();
            for _ in 0..calls {
                prop_assert!(scan.has_next().unwrap());
            }
            prop_assert_eq!(scan.next().unwrap(), row(1, "a"));
            scan.close();
        }
    }
}
