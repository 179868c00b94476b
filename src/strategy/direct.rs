//! Direct persistence strategy
//!
//! Every row the resolver produces goes to the store immediately, so parent
//! ids are store-assigned and splits can reference them as they flush. The
//! simplest possible write path: one round trip per row, nothing buffered,
//! nothing to consolidate.

use crate::core::{process_files, source_files, RunSummary};
use crate::store::{DirectSink, RecordSink, StoreBackend};
use crate::strategy::{prepare_run, ImportStrategy, RunOptions};
use crate::types::ImportError;

/// Row-at-a-time import
#[derive(Debug)]
pub struct DirectStrategy<B> {
    backend: B,
}

impl<B: StoreBackend> DirectStrategy<B> {
    /// Create a strategy writing through `backend`
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: StoreBackend> ImportStrategy for DirectStrategy<B> {
    /// Run the import, writing each row as it is produced
    ///
    /// Builds a tokio multi-threaded runtime and drives the shared
    /// pipeline: run prelude, file derivation, streaming resolve, finalize.
    ///
    /// # Errors
    ///
    /// Runtime construction failure, or any unrecoverable error from the
    /// pipeline. Rows written before the failure stay written.
    fn run(&self, options: &RunOptions) -> Result<RunSummary, ImportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        runtime.block_on(async {
            let accounts = prepare_run(&self.backend).await?;
            let known = accounts.iter().cloned().collect();
            let files = source_files(&accounts, options.combine_accounts);

            let mut sink = DirectSink::new(&self.backend);
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
    fn test_run_writes_rows_and_brackets_dates() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("Checking-export.qif")).unwrap();
        f.write_all(b"D1/2'24\nU-12.50\nPStore\nSCatA\n$-12.50\n^\n")
            .unwrap();

        let backend = MemoryBackend::new(&["Checking"]);
        let strategy = DirectStrategy::new(backend);
        let options = RunOptions {
            qif_dir: dir.path().to_path_buf(),
            combine_accounts: false,
        };

        let summary = strategy.run(&options).unwrap();
        assert_eq!(summary.accounts.len(), 1);
        assert_eq!(summary.accounts[0].records_written, 1);

        let backend = strategy.backend;
        assert_eq!(backend.transactions().len(), 1);
        assert_eq!(backend.splits().len(), 1);
        assert_eq!(
            backend.bracket_calls(),
            vec![
                "clear_transactions".to_string(),
                "extend_switchover_date".to_string(),
                "extend_categories".to_string(),
            ]
        );
        // direct mode never stages or consolidates
        assert!(backend.staged_transactions().is_empty());
        assert!(!backend.consolidated());
    }
}
