//! Core storage engine for a newline-delimited JSON record store.
//!
//! A table is a flat file of JSON objects, one per line, each line a
//! "slot" terminated by a newline. Updates and deletes never shift other
//! records: a shrinking update pads its old slot with dummy filler bytes
//! instead of rewriting the rest of the file, and a delete turns the slot
//! into a tombstone the same way. Inserts and grown updates reuse the
//! first tombstone slot large enough to hold them before falling back to
//! appending at end-of-file.
//!
//! [`engine::TableEngine`] implements that algorithm over one
//! [`stream::ByteStream`]. [`store::Store`] is a named registry of engines.
//! [`database::Database`] is the directory-backed facade most callers want:
//! it owns table files under a directory, auto-assigns ids, and supports
//! compaction.

pub mod config;
pub mod database;
pub mod engine;
pub mod error;
mod persistence;
pub mod store;
pub mod stream;

pub use config::StoreConfig;
pub use database::Database;
pub use engine::TableEngine;
pub use error::StoreError;
pub use store::Store;
pub use stream::{ByteStream, FileStream, MemStream};
