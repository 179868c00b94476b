//! QIF import CLI
//!
//! Reads QIF export files from a directory and imports their transactions,
//! zero records, and splits into a SQLite accounting database.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- exports/ --database money.db
//! cargo run -- exports/ --database money.db --strategy batch
//! cargo run -- exports/ --database money.db --accounts accounts.json
//! cargo run -- exports/ --database money.db --combine-accounts
//! ```
//!
//! The recognized account list comes from the database's Account table,
//! optionally seeded first from a JSON file via `--accounts`. Per-account
//! mode reads one `<Name>-export.qif` per account; `--combine-accounts`
//! reads a single `all-export.qif` whose `!Account` header blocks announce
//! account switches.
//!
//! # Exit Codes
//!
//! - 0: Success (skipped files are warnings, not failures)
//! - 1: Error (bad arguments, unreadable database, malformed input, etc.)

use qif_import_engine::cli;
use qif_import_engine::store::SqliteBackend;
use qif_import_engine::strategy::{self, RunOptions};
use std::process;

fn main() {
    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), qif_import_engine::types::ImportError> {
    let backend = SqliteBackend::open(&args.database)?;

    if let Some(path) = &args.accounts {
        let names = cli::load_accounts(path)?;
        backend.seed_accounts(&names)?;
    }

    let strategy = strategy::create_strategy(args.strategy.into(), backend);
    let options = RunOptions {
        qif_dir: args.qif_dir.clone(),
        combine_accounts: args.combine_accounts,
    };

    let summary = strategy.run(&options)?;
    for account in &summary.accounts {
        println!("{}", account);
    }
    if !summary.skipped_files.is_empty() {
        eprintln!("Skipped {} file(s):", summary.skipped_files.len());
        for file in &summary.skipped_files {
            eprintln!("  {}", file);
        }
    }

    Ok(())
}
