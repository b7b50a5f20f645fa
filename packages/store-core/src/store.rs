//! The table registry: a named collection of [`TableEngine`]s with no
//! knowledge of where their streams come from or how they're locked by
//! callers above it.

use std::collections::HashMap;

use crate::engine::TableEngine;
use crate::error::StoreError;
use crate::stream::ByteStream;

/// A registry of tables, keyed by name.
#[derive(Default)]
pub struct Store {
    tables: HashMap<String, TableEngine>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Store {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Registers a new table backed by `stream`, scanning it to build the
    /// table's offset index.
    pub fn create_table(
        &mut self,
        name: impl Into<String>,
        stream: Box<dyn ByteStream>,
    ) -> Result<(), StoreError> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(StoreError::TableExists { table: name });
        }
        let engine = TableEngine::open(name.clone(), stream)?;
        tracing::info!(table = %name, "table created");
        self.tables.insert(name, engine);
        Ok(())
    }

    /// Removes and closes the named table.
    pub fn remove_table(&mut self, name: &str) -> Result<(), StoreError> {
        let engine = self
            .tables
            .remove(name)
            .ok_or_else(|| StoreError::NoTable {
                table: name.to_string(),
            })?;
        engine.close()?;
        tracing::info!(table = name, "table removed");
        Ok(())
    }

    /// Whether a table with this name is registered.
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Names of all registered tables, in unspecified order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    fn engine(&self, name: &str) -> Result<&TableEngine, StoreError> {
        self.tables.get(name).ok_or_else(|| StoreError::NoTable {
            table: name.to_string(),
        })
    }

    /// Returns a fresh copy of the record `id` in table `table`.
    pub fn read_rec(&self, table: &str, id: u64) -> Result<Vec<u8>, StoreError> {
        self.engine(table)?.read_rec(id)
    }

    /// Inserts a new record `id` into table `table`.
    pub fn insert_rec(&self, table: &str, id: u64, bytes: &[u8]) -> Result<(), StoreError> {
        self.engine(table)?.insert_rec(id, bytes)
    }

    /// Replaces the record `id` in table `table`.
    pub fn update_rec(&self, table: &str, id: u64, bytes: &[u8]) -> Result<(), StoreError> {
        self.engine(table)?.update_rec(id, bytes)
    }

    /// Tombstones the record `id` in table `table`.
    pub fn delete_rec(&self, table: &str, id: u64) -> Result<(), StoreError> {
        self.engine(table)?.delete_rec(id)
    }

    /// The largest id currently live in table `table`, or 0 if empty.
    pub fn get_last_id(&self, table: &str) -> Result<u64, StoreError> {
        self.engine(table)?.last_id()
    }

    /// All ids currently live in table `table`, in unspecified order.
    pub fn ids(&self, table: &str) -> Result<Vec<u64>, StoreError> {
        self.engine(table)?.ids()
    }

    /// Closes every registered table and empties the registry.
    pub fn close(&mut self) -> Result<(), StoreError> {
        for (name, engine) in self.tables.iter() {
            if let Err(e) = engine.close() {
                tracing::error!(table = %name, error = %e, "failed to close table");
                return Err(e);
            }
        }
        self.tables.clear();
        Ok(())
    }
}
