use crate::strategy::StrategyKind;
use crate::types::ImportError;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Import QIF export files into an accounting database
#[derive(Parser, Debug)]
#[command(name = "qif-import")]
#[command(about = "Import QIF export files into an accounting database", long_about = None)]
pub struct CliArgs {
    /// Directory containing the export files
    #[arg(value_name = "QIF_DIR", help = "Directory the QIF export files are read from")]
    pub qif_dir: PathBuf,

    /// Target SQLite database file
    #[arg(
        long = "database",
        value_name = "FILE",
        help = "SQLite database file to import into"
    )]
    pub database: PathBuf,

    /// Persistence strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "direct",
        help = "Persistence strategy: 'direct' writes each row immediately, \
                'batch' bulk-loads everything at the end"
    )]
    pub strategy: StrategyType,

    /// Optional JSON file seeding the recognized account list
    #[arg(
        long = "accounts",
        value_name = "JSON",
        help = "JSON file with an \"accounts\" array to seed into the database"
    )]
    pub accounts: Option<PathBuf>,

    /// Read one combined multi-account export instead of per-account files
    #[arg(
        long = "combine-accounts",
        help = "Read a single all-export.qif with !Account header blocks"
    )]
    pub combine_accounts: bool,
}

/// Available persistence strategies
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyType {
    Direct,
    Batch,
}

impl From<StrategyType> for StrategyKind {
    fn from(value: StrategyType) -> Self {
        match value {
            StrategyType::Direct => StrategyKind::Direct,
            StrategyType::Batch => StrategyKind::Batch,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccountsFile {
    accounts: Vec<String>,
}

/// Read the account names from a seed file
///
/// The file is a JSON object with a single `accounts` array of names.
///
/// # Errors
///
/// A missing or unreadable file, or JSON of the wrong shape.
pub fn load_accounts(path: &Path) -> Result<Vec<String>, ImportError> {
    let content = std::fs::read_to_string(path)?;
    let parsed: AccountsFile = serde_json::from_str(&content)?;
    Ok(parsed.accounts)
}
