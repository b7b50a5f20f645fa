use ntest::timeout;
use serde_json::json;
use store_core::{Database, StoreConfig};
use tempfile::tempdir;

#[test]
#[timeout(5000)]
fn compact_shrinks_a_file_full_of_tombstones() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("t").unwrap();

    let mut ids = Vec::new();
    for i in 0..20 {
        ids.push(db.insert("t", json!({"name": format!("row-{i}")})).unwrap());
    }
    for id in &ids[..15] {
        db.delete("t", *id).unwrap();
    }

    let before = std::fs::metadata(dir.path().join("t.jsondb")).unwrap().len();
    db.compact("t").unwrap();
    let after = std::fs::metadata(dir.path().join("t.jsondb")).unwrap().len();

    assert!(after < before);
    assert_eq!(db.ids("t").unwrap().len(), 5);
}

#[test]
#[timeout(5000)]
fn compact_leaves_a_backup_of_the_pre_compaction_file() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("t").unwrap();
    db.insert("t", json!({"name": "a"})).unwrap();
    db.delete("t", 1).unwrap();
    db.insert("t", json!({"name": "b"})).unwrap();

    db.compact("t").unwrap();

    let backup = dir.path().join("t.jsondb.bak");
    assert!(backup.exists());
}

#[test]
#[timeout(5000)]
fn records_survive_compaction_with_values_intact() {
    let dir = tempdir().unwrap();
    let db = Database::open(StoreConfig::new(dir.path())).unwrap();
    db.create_table("t").unwrap();
    let a = db.insert("t", json!({"name": "alice"})).unwrap();
    let b = db.insert("t", json!({"name": "bob"})).unwrap();
    db.compact("t").unwrap();

    assert_eq!(db.get("t", a).unwrap()["name"], "alice");
    assert_eq!(db.get("t", b).unwrap()["name"], "bob");
}
