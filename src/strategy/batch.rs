//! Deferred-batch persistence strategy
//!
//! The resolver writes into in-memory buffers with locally assigned ids;
//! nothing touches the store until the whole input is read. Finalization
//! bulk-loads the three staging tables concurrently and then asks the
//! backend to consolidate, re-linking local parent ids to store-assigned
//! ones. A failure anywhere before consolidation leaves the final tables
//! untouched (beyond the run prelude's clearing).

use crate::core::{process_files, source_files, RunSummary};
use crate::store::{BatchSink, RecordSink, StoreBackend};
use crate::strategy::{prepare_run, ImportStrategy, RunOptions};
use crate::types::ImportError;

/// Buffer-then-bulk-load import
#[derive(Debug)]
pub struct BatchStrategy<B> {
    backend: B,
}

impl<B: StoreBackend> BatchStrategy<B> {
    /// Create a strategy staging into `backend`
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: StoreBackend> ImportStrategy for BatchStrategy<B> {
    /// Run the import, deferring all store writes to the end
    ///
    /// # Errors
    ///
    /// Runtime construction failure, any unrecoverable pipeline error, or a
    /// bulk-load/consolidation failure at finalize time.
    fn run(&self, options: &RunOptions) -> Result<RunSummary, ImportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        runtime.block_on(async {
            let accounts = prepare_run(&self.backend).await?;
            let known = accounts.iter().cloned().collect();
            let files = source_files(&accounts, options.combine_accounts);

            let mut sink = BatchSink::new(&self.backend);
            let summary = process_files(&options.qif_dir, &files, &known, &mut sink).await?;
            sink.finalize().await?;
            Ok(summary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use std::io::Write as _;

    #[test]
    fn test_run_stages_and_consolidates() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("Checking-export.qif")).unwrap();
        f.write_all(b"D1/2'24\nU40.00\nPStore\nSCatA\n$25.00\nSCatB\n$15.00\n^\n")
            .unwrap();

        let backend = MemoryBackend::new(&["Checking"]);
        let strategy = BatchStrategy::new(backend);
        let options = RunOptions {
            qif_dir: dir.path().to_path_buf(),
            combine_accounts: false,
        };

        let summary = strategy.run(&options).unwrap();
        assert_eq!(summary.accounts[0].records_written, 1);

        let backend = strategy.backend;
        // everything arrived through the bulk-load path
        assert!(backend.transactions().is_empty());
        assert_eq!(backend.staged_transactions().len(), 1);
        assert_eq!(backend.staged_splits().len(), 2);
        assert!(backend.consolidated());
    }

    #[test]
    fn test_missing_file_still_consolidates_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("Checking-export.qif")).unwrap();
        f.write_all(b"D1/2'24\nU10.00\nPStore\n^\n").unwrap();

        let backend = MemoryBackend::new(&["Checking", "Savings"]);
        let strategy = BatchStrategy::new(backend);
        let options = RunOptions {
            qif_dir: dir.path().to_path_buf(),
            combine_accounts: false,
        };

        let summary = strategy.run(&options).unwrap();
        assert_eq!(summary.skipped_files.len(), 1);

        let backend = strategy.backend;
        assert_eq!(backend.staged_transactions().len(), 1);
        assert!(backend.consolidated());
    }
}
