//! End-to-end lifecycle scenarios exercising the full contract: creation,
//! CRUD, reopening, duplicate ids, and error taxonomy, all through the
//! [`Database`] facade against real files.

use ntest::timeout;
use serde_json::json;
use store_core::{Database, StoreConfig, StoreError};
use tempfile::tempdir;

#[test]
#[timeout(5000)]
fn scenario_full_table_lifecycle() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();

    assert!(db.create_table("events").is_ok());
    assert!(matches!(
        db.create_table("events").unwrap_err(),
        StoreError::TableExists { .. }
    ));

    let id = db.insert("events", json!({"kind": "login"})).unwrap();
    assert_eq!(db.get("events", id).unwrap()["kind"], "login");

    db.update(&"events".to_string(), id, json!({"id": id, "kind": "logout"}))
        .unwrap();
    assert_eq!(db.get("events", id).unwrap()["kind"], "logout");

    db.delete("events", id).unwrap();
    assert!(matches!(
        db.get("events", id).unwrap_err(),
        StoreError::NoRecord { .. }
    ));

    db.drop_table("events").unwrap();
    assert!(matches!(
        db.get("events", id).unwrap_err(),
        StoreError::NoTable { .. }
    ));
}

#[test]
#[timeout(5000)]
fn scenario_operations_on_unknown_table_report_no_table() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    assert!(matches!(
        db.insert("ghost", json!({})).unwrap_err(),
        StoreError::NoTable { .. }
    ));
    assert!(matches!(
        db.ids("ghost").unwrap_err(),
        StoreError::NoTable { .. }
    ));
}

#[test]
#[timeout(5000)]
fn scenario_reopening_a_file_with_a_duplicate_id_keeps_the_last_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dup.jsondb");
    std::fs::write(
        &path,
        b"{\"id\":1,\"v\":\"first\"}\n{\"id\":1,\"v\":\"second\"}\n",
    )
    .unwrap();

    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    assert_eq!(db.get("dup", 1).unwrap()["v"], "second");
    assert_eq!(db.ids("dup").unwrap(), vec![1]);
}

#[test]
#[timeout(5000)]
fn scenario_insert_existing_id_is_rejected() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("t").unwrap();
    db.insert("t", json!({"id": 7, "name": "a"})).unwrap();
    let err = db.insert("t", json!({"id": 7, "name": "b"})).unwrap_err();
    assert!(matches!(err, StoreError::IdExists { .. }));
}

#[test]
#[timeout(5000)]
fn scenario_many_tables_are_independent() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("a").unwrap();
    db.create_table("b").unwrap();

    db.insert("a", json!({"name": "in-a"})).unwrap();
    assert!(db.get("b", 1).is_err());

    let names = db.table_names().unwrap();
    assert_eq!(names.len(), 2);
}
