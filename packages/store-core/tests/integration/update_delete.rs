use ntest::timeout;
use serde_json::json;
use store_core::{Database, StoreConfig};
use tempfile::tempdir;

#[test]
#[timeout(5000)]
fn shrinking_update_does_not_move_neighbors() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("t").unwrap();

    let a = db
        .insert("t", json!({"name": "a very long original value"}))
        .unwrap();
    let b = db.insert("t", json!({"name": "b"})).unwrap();

    db.update(&"t".to_string(), a, json!({"id": a, "name": "short"})).unwrap();

    assert_eq!(db.get("t", a).unwrap()["name"], "short");
    assert_eq!(db.get("t", b).unwrap()["name"], "b");
}

#[test]
#[timeout(5000)]
fn growing_update_relocates_and_tombstones_the_old_slot() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("t").unwrap();

    let a = db.insert("t", json!({"name": "a"})).unwrap();
    let b = db.insert("t", json!({"name": "b"})).unwrap();

    db.update(
        &"t".to_string(),
        a,
        json!({"id": a, "name": "a much longer value than before"}),
    )
    .unwrap();

    assert_eq!(
        db.get("t", a).unwrap()["name"],
        "a much longer value than before"
    );
    assert_eq!(db.get("t", b).unwrap()["name"], "b");
}

#[test]
#[timeout(5000)]
fn delete_then_insert_can_reuse_the_tombstone() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("t").unwrap();

    let a = db
        .insert("t", json!({"name": "a record long enough to matter"}))
        .unwrap();
    db.delete("t", a).unwrap();

    let before = std::fs::metadata(dir.path().join("t.jsondb")).unwrap().len();
    db.insert("t", json!({"name": "fits"})).unwrap();
    let after = std::fs::metadata(dir.path().join("t.jsondb")).unwrap().len();
    assert_eq!(before, after, "a smaller insert should reuse the freed slot, not grow the file");
}

#[test]
#[timeout(5000)]
fn delete_is_idempotent_on_the_index_not_the_call() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("t").unwrap();
    let id = db.insert("t", json!({"name": "a"})).unwrap();
    db.delete("t", id).unwrap();
    assert!(db.delete("t", id).is_err());
}
