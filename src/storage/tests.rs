use super::*;
use crate::protocol::VersionedItem;
use tempfile::tempdir;

// ============================================================
// READ / APPEND TESTS
// ============================================================

#[test]
fn test_read_all_on_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), 10).unwrap();

    let records = storage.read_all().unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_append_then_read() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), 10).unwrap();

    storage.append(42, &VersionedItem::new("alpha", 1)).unwrap();
    storage.append(7, &VersionedItem::new("beta", 3)).unwrap();

    let records = storage.read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records.get(&42), Some(&VersionedItem::new("alpha", 1)));
    assert_eq!(records.get(&7), Some(&VersionedItem::new("beta", 3)));
}

#[test]
fn test_duplicate_appends_resolve_to_latest() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), 10).unwrap();

    storage.append(42, &VersionedItem::new("old", 1)).unwrap();
    storage.append(42, &VersionedItem::new("new", 2)).unwrap();

    let records = storage.read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records.get(&42), Some(&VersionedItem::new("new", 2)));
}

#[test]
fn test_latest_record_wins_by_file_order_not_version() {
    // Appends are resolved by position in the file; a later append with a
    // lower version still shadows the earlier record.
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), 10).unwrap();

    storage.append(42, &VersionedItem::new("newer", 5)).unwrap();
    storage.append(42, &VersionedItem::new("older", 2)).unwrap();

    let records = storage.read_all().unwrap();
    assert_eq!(records.get(&42), Some(&VersionedItem::new("older", 2)));
}

#[test]
fn test_append_all_batch() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), 10).unwrap();

    let mut batch = Records::new();
    batch.insert(1, VersionedItem::new("one", 1));
    batch.insert(2, VersionedItem::new("two", 1));
    batch.insert(3, VersionedItem::new("three", 2));
    storage.append_all(&batch).unwrap();

    assert_eq!(storage.read_all().unwrap(), batch);
}

// ============================================================
// REWRITE / CLEAR TESTS
// ============================================================

#[test]
fn test_write_all_replaces_previous_contents() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), 10).unwrap();

    storage.append(1, &VersionedItem::new("stale", 1)).unwrap();
    storage.append(2, &VersionedItem::new("stale", 1)).unwrap();

    let mut retained = Records::new();
    retained.insert(2, VersionedItem::new("kept", 4));
    storage.write_all(&retained).unwrap();

    let records = storage.read_all().unwrap();
    assert_eq!(records, retained);
}

#[test]
fn test_clear_truncates() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), 10).unwrap();

    storage.append(1, &VersionedItem::new("x", 1)).unwrap();
    storage.clear().unwrap();

    assert!(storage.read_all().unwrap().is_empty());
}

// ============================================================
// RECOVERY TESTS
// ============================================================

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();

    {
        let storage = FileStorage::open(dir.path(), 30).unwrap();
        storage.append(55, &VersionedItem::new("persisted", 2)).unwrap();
    }

    // A fresh handle over the same directory sees the old records.
    let storage = FileStorage::open(dir.path(), 30).unwrap();
    let records = storage.read_all().unwrap();
    assert_eq!(records.get(&55), Some(&VersionedItem::new("persisted", 2)));
}

#[test]
fn test_storage_files_are_per_node() {
    let dir = tempdir().unwrap();

    let storage_a = FileStorage::open(dir.path(), 10).unwrap();
    let storage_b = FileStorage::open(dir.path(), 20).unwrap();

    storage_a.append(1, &VersionedItem::new("a", 1)).unwrap();

    assert_eq!(storage_a.read_all().unwrap().len(), 1);
    assert!(storage_b.read_all().unwrap().is_empty());
}
