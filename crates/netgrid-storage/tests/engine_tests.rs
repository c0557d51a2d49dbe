//! Integration tests for the redb storage backend.

use std::ops::Bound;

use netgrid_storage::backends::RedbEngine;
use netgrid_storage::{StorageEngine, StorageError, Transaction};

fn create_test_engine() -> RedbEngine {
    RedbEngine::in_memory().expect("failed to create in-memory engine")
}

#[test]
fn write_and_read_back() {
    let engine = create_test_engine();

    {
        let mut tx = engine.begin_write().expect("begin write");
        tx.put("nodes", b"key", b"value").expect("put");
        tx.commit().expect("commit");
    }

    let tx = engine.begin_read().expect("begin read");
    assert_eq!(tx.get("nodes", b"key").expect("get"), Some(b"value".to_vec()));
    assert_eq!(tx.get("nodes", b"missing").expect("get"), None);
}

#[test]
fn uncommitted_writes_are_invisible() {
    let engine = create_test_engine();

    {
        let mut tx = engine.begin_write().expect("begin write");
        tx.put("nodes", b"key", b"value").expect("put");
        // Dropped without commit
    }

    let tx = engine.begin_read().expect("begin read");
    assert_eq!(tx.get("nodes", b"key").expect("get"), None);
}

#[test]
fn writes_are_visible_within_the_transaction() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.put("nodes", b"key", b"value").expect("put");
    assert_eq!(tx.get("nodes", b"key").expect("get"), Some(b"value".to_vec()));

    tx.delete("nodes", b"key").expect("delete");
    assert_eq!(tx.get("nodes", b"key").expect("get"), None);
}

#[test]
fn delete_reports_existence() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.put("nodes", b"key", b"value").expect("put");
    assert!(tx.delete("nodes", b"key").expect("delete"));
    assert!(!tx.delete("nodes", b"key").expect("delete again"));
}

#[test]
fn tables_are_disjoint() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.put("a_node", b"k", b"1").expect("put");
    tx.put("a_link", b"k", b"2").expect("put");
    tx.commit().expect("commit");

    let tx = engine.begin_read().expect("begin read");
    assert_eq!(tx.get("a_node", b"k").expect("get"), Some(b"1".to_vec()));
    assert_eq!(tx.get("a_link", b"k").expect("get"), Some(b"2".to_vec()));
    assert_eq!(tx.scan_table("a_node").expect("scan").len(), 1);
}

#[test]
fn scan_is_ordered_and_sees_pending_writes() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.put("t", &[3], b"c").expect("put");
    tx.put("t", &[1], b"a").expect("put");
    tx.commit().expect("commit");

    let mut tx = engine.begin_write().expect("begin write");
    tx.put("t", &[2], b"b").expect("put");
    tx.delete("t", &[3]).expect("delete");

    let rows = tx.scan_table("t").expect("scan");
    let keys: Vec<_> = rows.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(keys, vec![vec![1u8], vec![2u8]]);
}

#[test]
fn scan_range_respects_bounds() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    for i in 1u8..=5 {
        tx.put("t", &[i], &[i]).expect("put");
    }

    let rows = tx
        .scan_range("t", Bound::Included(&[2u8][..]), Bound::Excluded(&[4u8][..]))
        .expect("scan");
    let keys: Vec<_> = rows.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(keys, vec![vec![2u8], vec![3u8]]);
}

#[test]
fn savepoint_rollback_restores_marked_state() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.put("t", b"before", b"1").expect("put");
    tx.begin_savepoint("sp1").expect("savepoint");
    tx.put("t", b"inside", b"2").expect("put");
    tx.delete("t", b"before").expect("delete");
    tx.rollback_savepoint("sp1").expect("rollback");

    assert_eq!(tx.get("t", b"before").expect("get"), Some(b"1".to_vec()));
    assert_eq!(tx.get("t", b"inside").expect("get"), None);

    tx.commit().expect("commit");
    let tx = engine.begin_read().expect("begin read");
    assert_eq!(tx.get("t", b"before").expect("get"), Some(b"1".to_vec()));
}

#[test]
fn savepoint_release_keeps_writes() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.begin_savepoint("sp1").expect("savepoint");
    tx.put("t", b"inside", b"2").expect("put");
    tx.release_savepoint("sp1").expect("release");
    tx.commit().expect("commit");

    let tx = engine.begin_read().expect("begin read");
    assert_eq!(tx.get("t", b"inside").expect("get"), Some(b"2".to_vec()));
}

#[test]
fn nested_savepoints_roll_back_independently() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.begin_savepoint("outer").expect("savepoint");
    tx.put("t", b"a", b"1").expect("put");
    tx.begin_savepoint("inner").expect("savepoint");
    tx.put("t", b"b", b"2").expect("put");

    tx.rollback_savepoint("inner").expect("rollback inner");
    assert_eq!(tx.get("t", b"a").expect("get"), Some(b"1".to_vec()));
    assert_eq!(tx.get("t", b"b").expect("get"), None);

    tx.rollback_savepoint("outer").expect("rollback outer");
    assert_eq!(tx.get("t", b"a").expect("get"), None);
}

#[test]
fn releasing_an_outer_savepoint_discards_inner_marks() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.begin_savepoint("outer").expect("savepoint");
    tx.begin_savepoint("inner").expect("savepoint");
    tx.release_savepoint("outer").expect("release");

    assert!(matches!(
        tx.rollback_savepoint("inner"),
        Err(StorageError::NoSuchSavepoint(_))
    ));
}

#[test]
fn unknown_savepoint_is_an_error() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    assert!(matches!(
        tx.release_savepoint("ghost"),
        Err(StorageError::NoSuchSavepoint(_))
    ));
}

#[test]
fn clear_table_removes_only_that_table() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.put("a", b"k1", b"1").expect("put");
    tx.put("a", b"k2", b"2").expect("put");
    tx.put("b", b"k1", b"3").expect("put");
    tx.clear_table("a").expect("clear");

    assert!(tx.scan_table("a").expect("scan").is_empty());
    assert_eq!(tx.scan_table("b").expect("scan").len(), 1);
}

#[test]
fn read_only_transactions_reject_writes() {
    let engine = create_test_engine();

    let mut tx = engine.begin_read().expect("begin read");
    assert!(matches!(tx.put("t", b"k", b"v"), Err(StorageError::ReadOnly)));
    assert!(matches!(tx.delete("t", b"k"), Err(StorageError::ReadOnly)));
    assert!(matches!(tx.begin_savepoint("sp"), Err(StorageError::ReadOnly)));
}

#[test]
fn rollback_discards_everything() {
    let engine = create_test_engine();

    let mut tx = engine.begin_write().expect("begin write");
    tx.put("t", b"k", b"v").expect("put");
    tx.rollback().expect("rollback");

    let tx = engine.begin_read().expect("begin read");
    assert_eq!(tx.get("t", b"k").expect("get"), None);
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("test.redb");

    {
        let engine = RedbEngine::open(&path).expect("open");
        let mut tx = engine.begin_write().expect("begin write");
        tx.put("t", b"k", b"v").expect("put");
        tx.commit().expect("commit");
    }

    let engine = RedbEngine::open(&path).expect("reopen");
    let tx = engine.begin_read().expect("begin read");
    assert_eq!(tx.get("t", b"k").expect("get"), Some(b"v".to_vec()));
}
