use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect and operate on a directory of newline-delimited JSON tables.
#[derive(Parser, Debug)]
#[command(name = "store-cli", version, about)]
pub struct Cli {
    /// Directory holding the store's table files.
    #[arg(long, global = true, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Increase log verbosity; repeat for more (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging below errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new, empty table.
    CreateTable { table: String },
    /// Remove a table and delete its backing file.
    DropTable { table: String },
    /// List all tables in the store.
    ListTables,
    /// Print a record as JSON.
    Get { table: String, id: u64 },
    /// Insert a record; prints the id it was assigned.
    Put {
        table: String,
        /// JSON object to insert. If it has no `id` field, one is assigned.
        json: String,
    },
    /// Replace an existing record.
    Update {
        table: String,
        id: u64,
        json: String,
    },
    /// Delete a record by id.
    Delete { table: String, id: u64 },
    /// List the ids present in a table.
    Ids { table: String },
    /// Rewrite a table's file to drop tombstones left by updates/deletes.
    Compact { table: String },
}
