//! The database facade: a directory of table files, auto-assigned ids, and
//! compaction, layered over [`Store`].
//!
//! [`Database`] holds one [`RwLock<Store>`] guarding the table directory
//! itself (creating, dropping, compacting a table) and one
//! [`RwLock<HashMap<String, AtomicU64>>`] of per-table id counters used to
//! auto-assign ids the way the record store's original implementation did.
//! Record reads and writes only need the directory's *read* lock, since
//! each [`crate::engine::TableEngine`] already serializes its own access
//! internally; only structural changes to the table directory need the
//! write lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::persistence;
use crate::store::Store;
use crate::stream::{ByteStream, FileStream};

const ID_FIELD: &str = "id";

/// A directory of newline-delimited JSON tables.
pub struct Database {
    config: StoreConfig,
    store: RwLock<Store>,
    last_ids: RwLock<HashMap<String, AtomicU64>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("data_dir", &self.config.data_dir)
            .finish()
    }
}

fn poisoned(table: &str) -> StoreError {
    StoreError::LockPoisoned {
        table: table.to_string(),
    }
}

fn log_io(table: &str, op: &str, err: std::io::Error) -> StoreError {
    tracing::error!(table, op, error = %err, "I/O operation failed");
    StoreError::from(err)
}

impl Database {
    /// Opens the database rooted at `config.data_dir`, loading any table
    /// files already present and rebuilding their offset indexes.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if config.create_if_missing && !config.data_dir.exists() {
            std::fs::create_dir_all(&config.data_dir)
                .map_err(|e| log_io("<database>", "create_dir_all", e))?;
        }

        let mut store = Store::new();
        let mut last_ids = HashMap::new();
        for (name, path) in persistence::discover_tables(&config)? {
            let stream: Box<dyn ByteStream> =
                Box::new(FileStream::open(&path).map_err(|e| log_io(&name, "open", e))?);
            store.create_table(name.clone(), stream)?;
            let last_id = store.get_last_id(&name)?;
            last_ids.insert(name.clone(), AtomicU64::new(last_id));
            tracing::info!(table = %name, path = %path.display(), "loaded table");
        }

        Ok(Self {
            config,
            store: RwLock::new(store),
            last_ids: RwLock::new(last_ids),
        })
    }

    fn read_store(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>, StoreError> {
        self.store.read().map_err(|_| poisoned("<database>"))
    }

    fn write_store(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>, StoreError> {
        self.store.write().map_err(|_| poisoned("<database>"))
    }

    /// Creates a new, empty table backed by a fresh file under `data_dir`.
    pub fn create_table(&self, name: &str) -> Result<(), StoreError> {
        let mut store = self.write_store()?;
        let path = self.config.table_path(name);
        let stream: Box<dyn ByteStream> =
            Box::new(FileStream::open(&path).map_err(|e| log_io(name, "open", e))?);
        store.create_table(name, stream)?;
        let mut last_ids = self.last_ids.write().map_err(|_| poisoned("<database>"))?;
        last_ids.insert(name.to_string(), AtomicU64::new(0));
        Ok(())
    }

    /// Removes a table from the registry and deletes its backing file.
    pub fn drop_table(&self, name: &str) -> Result<(), StoreError> {
        let mut store = self.write_store()?;
        store.remove_table(name)?;
        let path = self.config.table_path(name);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| log_io(name, "remove_file", e))?;
        }
        self.last_ids
            .write()
            .map_err(|_| poisoned("<database>"))?
            .remove(name);
        Ok(())
    }

    /// Whether `name` is a currently registered table.
    pub fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.read_store()?.table_exists(name))
    }

    /// Names of all registered tables, in unspecified order.
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_store()?.table_names())
    }

    /// Returns the record `id` in `table`, decoded as JSON.
    pub fn get(&self, table: &str, id: u64) -> Result<Value, StoreError> {
        let bytes = self.read_store()?.read_rec(table, id)?;
        decode_record(table, &bytes)
    }

    /// Inserts `record` into `table`. If `record`'s `id` field is absent or
    /// null, the next id for the table is auto-assigned and written back
    /// into the record; an explicit id bumps the table's counter so later
    /// auto-assignments never collide with it. Returns the id used.
    pub fn insert(&self, table: &str, mut record: Value) -> Result<u64, StoreError> {
        let explicit_id = record.get(ID_FIELD).and_then(Value::as_u64);
        let id = self.reserve_id(table, explicit_id)?;
        set_id(&mut record, id);
        let bytes = encode_record(table, &record)?;
        self.read_store()?.insert_rec(table, id, &bytes)?;
        Ok(id)
    }

    /// Replaces the record `id` in `table` with `record`. `record`'s `id`
    /// field, if present, must match `id`.
    pub fn update(&self, table: &str, id: u64, mut record: Value) -> Result<(), StoreError> {
        if let Some(found) = record.get(ID_FIELD).and_then(Value::as_u64) {
            if found != id {
                return Err(StoreError::FormatError {
                    table: table.to_string(),
                    reason: format!("record id {found} does not match target id {id}"),
                });
            }
        } else {
            set_id(&mut record, id);
        }
        let bytes = encode_record(table, &record)?;
        self.read_store()?.update_rec(table, id, &bytes)
    }

    /// Deletes the record `id` from `table`.
    pub fn delete(&self, table: &str, id: u64) -> Result<(), StoreError> {
        self.read_store()?.delete_rec(table, id)
    }

    /// All ids currently live in `table`, in unspecified order.
    pub fn ids(&self, table: &str) -> Result<Vec<u64>, StoreError> {
        self.read_store()?.ids(table)
    }

    /// The largest id currently live in `table`, or 0 if empty.
    pub fn last_id(&self, table: &str) -> Result<u64, StoreError> {
        self.read_store()?.get_last_id(table)
    }

    /// Rewrites `table`'s backing file to hold only its live records,
    /// packed back-to-back with no tombstones. Backs the original file up
    /// to a sibling `.bak` file first; if compaction fails partway through,
    /// the backup is the only copy of the pre-compaction data and should be
    /// treated as the source of truth.
    pub fn compact(&self, table: &str) -> Result<(), StoreError> {
        let mut store = self.write_store()?;

        let ids = store.ids(table)?;
        let path = self.config.table_path(table);
        let bytes_before = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        tracing::info!(
            table,
            live_records = ids.len(),
            bytes_before,
            "compacting table"
        );

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            let bytes = store.read_rec(table, *id)?;
            records.push((*id, strip_trailing_newline(bytes)));
        }

        if path.exists() {
            persistence::backup_file(&path).map_err(|e| log_io(table, "backup_file", e))?;
        }

        store.remove_table(table)?;
        let stream: Box<dyn ByteStream> =
            Box::new(FileStream::open(&path).map_err(|e| log_io(table, "open", e))?);
        store.create_table(table, stream)?;
        for (id, bytes) in records {
            store.insert_rec(table, id, &bytes)?;
        }

        let bytes_after = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        tracing::info!(
            table,
            live_records = ids.len(),
            bytes_before,
            bytes_after,
            "compacted table"
        );
        Ok(())
    }

    /// Closes every table and releases the database's resources.
    pub fn close(&self) -> Result<(), StoreError> {
        self.write_store()?.close()
    }

    fn reserve_id(&self, table: &str, explicit: Option<u64>) -> Result<u64, StoreError> {
        let last_ids = self.last_ids.read().map_err(|_| poisoned("<database>"))?;
        let counter = last_ids
            .get(table)
            .ok_or_else(|| StoreError::NoTable {
                table: table.to_string(),
            })?;
        match explicit {
            Some(id) => {
                counter.fetch_max(id, Ordering::SeqCst);
                Ok(id)
            }
            None => Ok(counter.fetch_add(1, Ordering::SeqCst) + 1),
        }
    }
}

fn set_id(record: &mut Value, id: u64) {
    if let Value::Object(map) = record {
        map.insert(ID_FIELD.to_string(), Value::from(id));
    }
}

fn encode_record(table: &str, record: &Value) -> Result<Vec<u8>, StoreError> {
    if !record.is_object() {
        return Err(StoreError::FormatError {
            table: table.to_string(),
            reason: "record must be a JSON object".to_string(),
        });
    }
    serde_json::to_vec(record).map_err(|e| StoreError::FormatError {
        table: table.to_string(),
        reason: format!("failed to encode record: {e}"),
    })
}

fn decode_record(table: &str, bytes: &[u8]) -> Result<Value, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::FormatError {
        table: table.to_string(),
        reason: format!("failed to decode record: {e}"),
    })
}

fn strip_trailing_newline(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    bytes
}
