//! Write-through sink for direct persistence
//!
//! Every `create_*` call performs one store round trip and hands back the
//! store-assigned identifier immediately, so the line-consumption loop
//! pauses at each `S` and `^` directive until the write completes. Simple
//! and immediately consistent, at the cost of serializing every record
//! behind store latency. `finalize` is a no-op — the writes already took
//! effect.

use crate::store::{RecordSink, StoreBackend};
use crate::types::{
    ImportError, SplitRow, TransactionId, TransactionRow, ZeroRecordId, ZeroRecordRow,
};

/// Round-trip-per-row sink over a [`StoreBackend`]
#[derive(Debug)]
pub struct DirectSink<'a, B: StoreBackend> {
    backend: &'a B,
}

impl<'a, B: StoreBackend> DirectSink<'a, B> {
    /// Create a direct sink writing through the given backend
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }
}

impl<B: StoreBackend> RecordSink for DirectSink<'_, B> {
    async fn create_transaction(
        &mut self,
        row: TransactionRow,
    ) -> Result<TransactionId, ImportError> {
        self.backend.insert_transaction(&row).await
    }

    async fn create_zero_record(
        &mut self,
        row: ZeroRecordRow,
    ) -> Result<ZeroRecordId, ImportError> {
        self.backend.insert_zero_record(&row).await
    }

    async fn create_split(&mut self, row: SplitRow) -> Result<(), ImportError> {
        self.backend.insert_split(&row).await?;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<(), ImportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use crate::types::ParentRef;
    use rust_decimal::Decimal;

    fn transaction_row(description: &str) -> TransactionRow {
        TransactionRow {
            account: "Checking".to_string(),
            date: None,
            description: description.to_string(),
            amount: Decimal::new(-5000, 2),
            reconciled: false,
            cleared: false,
            check_number: String::new(),
            memo: String::new(),
        }
    }

    #[tokio::test]
    async fn test_ids_come_from_the_store() {
        let backend = MemoryBackend::new(&["Checking"]);
        let mut sink = DirectSink::new(&backend);

        let first = sink.create_transaction(transaction_row("a")).await.unwrap();
        let second = sink.create_transaction(transaction_row("b")).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(backend.transactions().len(), 2);
    }

    #[tokio::test]
    async fn test_writes_take_effect_before_finalize() {
        let backend = MemoryBackend::new(&["Checking"]);
        let mut sink = DirectSink::new(&backend);

        let id = sink.create_transaction(transaction_row("a")).await.unwrap();
        sink.create_split(SplitRow {
            parent: ParentRef::Transaction(id),
            category: "CatA".to_string(),
            amount: Decimal::new(-5000, 2),
            reference_date: None,
            description: String::new(),
        })
        .await
        .unwrap();

        // visible without finalize
        assert_eq!(backend.splits().len(), 1);
        sink.finalize().await.unwrap();
        assert!(!backend.consolidated());
    }
}
