use ntest::timeout;
use serde_json::json;
use store_core::{Database, StoreConfig};
use tempfile::tempdir;

#[test]
#[timeout(5000)]
fn reopening_the_store_finds_existing_tables() {
    let dir = tempdir().unwrap();
    let config = StoreConfig::new(dir.path());

    {
        let db = Database::open(config.clone()).unwrap();
        db.create_table("accounts").unwrap();
        db.insert("accounts", json!({"name": "ada"})).unwrap();
        db.insert("accounts", json!({"name": "grace"})).unwrap();
        db.close().unwrap();
    }

    let db = Database::open(config).unwrap();
    assert!(db.table_exists("accounts").unwrap());
    let mut ids = db.ids("accounts").unwrap();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(db.get("accounts", 1).unwrap()["name"], "ada");
}

#[test]
#[timeout(5000)]
fn reopen_preserves_tombstones_and_refuses_stale_ids() {
    let dir = tempdir().unwrap();
    let config = StoreConfig::new(dir.path());

    {
        let db = Database::open(config.clone()).unwrap();
        db.create_table("accounts").unwrap();
        let id = db.insert("accounts", json!({"name": "ada"})).unwrap();
        db.delete("accounts", id).unwrap();
        db.close().unwrap();
    }

    let db = Database::open(config).unwrap();
    assert!(db.get("accounts", 1).is_err());
    assert!(db.ids("accounts").unwrap().is_empty());

    let id = db.insert("accounts", json!({"name": "bob"})).unwrap();
    assert_eq!(db.get("accounts", id).unwrap()["name"], "bob");
}
