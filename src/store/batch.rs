//! Buffering sink for deferred-batch persistence
//!
//! No round trip happens while files are being parsed: each `create_*` call
//! assigns the next value from a local monotonically increasing counter
//! (separate sequences for transactions and zero records, starting at 1 so
//! 0 can never be mistaken for a real id) and appends the row to an
//! in-memory buffer. `finalize` stages all three buffers — the tables are
//! independent, so the loads run concurrently — and then invokes the
//! consolidating store call, which must translate the local surrogate
//! identifiers into final ones.
//!
//! Trade-off versus the direct sink: per-record latency disappears entirely,
//! but the whole run's rows are held in memory and the consolidating step
//! has to re-link surrogate keys.

use crate::store::{RecordSink, StoreBackend};
use crate::types::{
    ImportError, SplitRow, TransactionId, TransactionRow, ZeroRecordId, ZeroRecordRow,
};

/// Buffering sink with local surrogate identifiers
#[derive(Debug)]
pub struct BatchSink<'a, B: StoreBackend> {
    backend: &'a B,
    next_transaction_id: TransactionId,
    next_zero_record_id: ZeroRecordId,
    transactions: Vec<(TransactionId, TransactionRow)>,
    zero_records: Vec<(ZeroRecordId, ZeroRecordRow)>,
    splits: Vec<SplitRow>,
}

impl<'a, B: StoreBackend> BatchSink<'a, B> {
    /// Create a batch sink staging through the given backend
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            next_transaction_id: 1,
            next_zero_record_id: 1,
            transactions: Vec::new(),
            zero_records: Vec::new(),
            splits: Vec::new(),
        }
    }

    /// Number of rows currently buffered across all three tables
    pub fn buffered_rows(&self) -> usize {
        self.transactions.len() + self.zero_records.len() + self.splits.len()
    }
}

impl<B: StoreBackend> RecordSink for BatchSink<'_, B> {
    async fn create_transaction(
        &mut self,
        row: TransactionRow,
    ) -> Result<TransactionId, ImportError> {
        let id = self.next_transaction_id;
        self.next_transaction_id += 1;
        self.transactions.push((id, row));
        Ok(id)
    }

    async fn create_zero_record(
        &mut self,
        row: ZeroRecordRow,
    ) -> Result<ZeroRecordId, ImportError> {
        let id = self.next_zero_record_id;
        self.next_zero_record_id += 1;
        self.zero_records.push((id, row));
        Ok(id)
    }

    async fn create_split(&mut self, row: SplitRow) -> Result<(), ImportError> {
        self.splits.push(row);
        Ok(())
    }

    /// Stage the three buffers concurrently, then consolidate
    ///
    /// All loads must complete before the consolidating call runs; a failed
    /// load surfaces with the offending table name and consolidation is
    /// never attempted.
    async fn finalize(&mut self) -> Result<(), ImportError> {
        futures::try_join!(
            self.backend.bulk_load_transactions(&self.transactions),
            self.backend.bulk_load_zero_records(&self.zero_records),
            self.backend.bulk_load_splits(&self.splits),
        )?;

        self.backend.consolidate().await?;

        self.transactions.clear();
        self.zero_records.clear();
        self.splits.clear();
        Ok(())
    }
}
