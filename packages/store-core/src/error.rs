//! Store error types.

use thiserror::Error;

/// Errors returned by the store engine and the database facade.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Table not found
    #[error("Table '{table}' not found")]
    NoTable { table: String },

    /// Table already exists
    #[error("Table '{table}' already exists")]
    TableExists { table: String },

    /// Record id not present in the table's offset index
    #[error("No record with id {id} in table '{table}'")]
    NoRecord { table: String, id: u64 },

    /// `InsertRec` called with an id already present in the index
    #[error("Id {id} already exists in table '{table}'")]
    IdExists { table: String, id: u64 },

    /// Index construction found a live-looking slot that did not decode to
    /// a JSON object with an integer `id` field
    #[error("Table '{table}' contains a malformed record: {reason}")]
    FormatError { table: String, reason: String },

    /// A facade- or engine-internal lock was poisoned by a panicking holder
    #[error("Lock poisoned for table '{table}'")]
    LockPoisoned { table: String },

    /// The underlying byte stream failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}
