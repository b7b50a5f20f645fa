//! Store configuration.

use std::path::PathBuf;

/// Configuration for opening a directory-backed [`crate::database::Database`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory scanned for table files when the store opens.
    pub data_dir: PathBuf,
    /// Filename suffix table files carry, without the leading dot.
    pub table_extension: String,
    /// Whether `create_table` may create a new file under `data_dir`, as
    /// opposed to only operating on files that already exist there.
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            table_extension: "jsondb".to_string(),
            create_if_missing: true,
        }
    }
}

impl StoreConfig {
    /// Returns a config rooted at `data_dir` with the other fields defaulted.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Path a table named `name` would live at under this config.
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.{}", self.table_extension))
    }
}
