mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use store_core::{Database, StoreConfig};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = StoreConfig::new(cli.data_dir.clone());
    let db = Database::open(config).with_context(|| {
        format!("failed to open store at {}", cli.data_dir.display())
    })?;

    match cli.command {
        Command::CreateTable { table } => {
            db.create_table(&table)?;
            println!("created table '{table}'");
        }
        Command::DropTable { table } => {
            db.drop_table(&table)?;
            println!("dropped table '{table}'");
        }
        Command::ListTables => {
            for name in db.table_names()? {
                println!("{name}");
            }
        }
        Command::Get { table, id } => {
            let record = db.get(&table, id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Put { table, json } => {
            let value = serde_json::from_str(&json).context("input is not valid JSON")?;
            let id = db.insert(&table, value)?;
            println!("{id}");
        }
        Command::Update { table, id, json } => {
            let value = serde_json::from_str(&json).context("input is not valid JSON")?;
            db.update(&table, id, value)?;
            println!("updated {id}");
        }
        Command::Delete { table, id } => {
            db.delete(&table, id)?;
            println!("deleted {id}");
        }
        Command::Ids { table } => {
            let mut ids = db.ids(&table)?;
            ids.sort_unstable();
            for id in ids {
                println!("{id}");
            }
        }
        Command::Compact { table } => {
            db.compact(&table)?;
            println!("compacted table '{table}'");
        }
    }

    db.close()?;
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_directive = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
