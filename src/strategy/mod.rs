//! Persistence strategy selection
//!
//! Both strategies drive the same resolver pipeline; they differ only in
//! when rows reach the store. [`DirectStrategy`] writes each row as it is
//! produced, so ids are always store-assigned and a crash leaves everything
//! written so far in place. [`BatchStrategy`] buffers everything in memory,
//! bulk-loads at the end, and consolidates — faster for large imports, all
//! or nothing on failure.

mod batch;
mod direct;

pub use batch::BatchStrategy;
pub use direct::DirectStrategy;

use crate::core::RunSummary;
use crate::store::backend::StoreBackend;
use crate::types::ImportError;
use std::path::PathBuf;

/// Settings a run needs beyond the backend itself
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory the export files are read from
    pub qif_dir: PathBuf,
    /// Read one combined multi-account file instead of per-account files
    pub combine_accounts: bool,
}

/// Which strategy a run should use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Write each row as it is produced
    Direct,
    /// Buffer rows, bulk-load and consolidate at the end
    Batch,
}

/// A complete import run against some backend
///
/// `run` is synchronous at the call site; each implementation owns its
/// async runtime.
pub trait ImportStrategy {
    /// Execute the import
    ///
    /// # Errors
    ///
    /// Any unrecoverable parse, read, or store failure.
    fn run(&self, options: &RunOptions) -> Result<RunSummary, ImportError>;
}

/// Build the strategy selected on the command line
pub fn create_strategy<B: StoreBackend + 'static>(
    kind: StrategyKind,
    backend: B,
) -> Box<dyn ImportStrategy> {
    match kind {
        StrategyKind::Direct => Box::new(DirectStrategy::new(backend)),
        StrategyKind::Batch => Box::new(BatchStrategy::new(backend)),
    }
}

/// Run prelude shared by both strategies
///
/// Reads the recognized account set, clears previously imported rows, and
/// pushes the bracketing dates forward. Returns the account names.
pub(crate) async fn prepare_run<B: StoreBackend>(
    backend: &B,
) -> Result<Vec<String>, ImportError> {
    let accounts = backend.account_names().await?;
    backend.clear_transactions().await?;
    backend.extend_switchover_date().await?;
    backend.extend_categories().await?;
    Ok(accounts)
}
