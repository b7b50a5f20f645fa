//! Directory-backed table discovery and compaction-time file backup.
//!
//! This module has no notion of the wire format stored inside a table file;
//! it only deals in file names and paths, matching the separation between
//! [`crate::engine`] (the record format) and [`crate::database`] (the
//! directory of tables).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;

/// Table files already present under `config.data_dir`, as `(table name,
/// path)` pairs. Returns an empty list if the directory does not exist.
pub(crate) fn discover_tables(config: &StoreConfig) -> io::Result<Vec<(String, PathBuf)>> {
    if !config.data_dir.exists() {
        return Ok(Vec::new());
    }
    let suffix = format!(".{}", config.table_extension);
    let mut found = Vec::new();
    for entry in fs::read_dir(&config.data_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(name) = file_name.strip_suffix(&suffix) {
            found.push((name.to_string(), path));
        }
    }
    Ok(found)
}

/// Copies `path` to a sibling `.bak` file ahead of a destructive rewrite,
/// overwriting any backup left by a previous compaction.
pub(crate) fn backup_file(path: &Path) -> io::Result<PathBuf> {
    let mut backup_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    backup_name.push_str(".bak");
    let backup_path = path.with_file_name(backup_name);
    fs::copy(path, &backup_path)?;
    Ok(backup_path)
}
