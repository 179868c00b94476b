//! In-memory recording backend
//!
//! Implements [`StoreBackend`] over plain vectors behind a mutex. Used by
//! the unit and scenario tests to observe exactly which rows and boundary
//! calls a run produced, and to inject bulk-load failures.

use crate::store::StoreBackend;
use crate::types::{
    ImportError, SplitId, SplitRow, TransactionId, TransactionRow, ZeroRecordId, ZeroRecordRow,
};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    transactions: Vec<(TransactionId, TransactionRow)>,
    zero_records: Vec<(ZeroRecordId, ZeroRecordRow)>,
    splits: Vec<SplitRow>,
    staged_transactions: Vec<(TransactionId, TransactionRow)>,
    staged_zero_records: Vec<(ZeroRecordId, ZeroRecordRow)>,
    staged_splits: Vec<SplitRow>,
    next_transaction_id: TransactionId,
    next_zero_record_id: ZeroRecordId,
    next_split_id: SplitId,
    bracket_calls: Vec<String>,
    consolidated: bool,
    fail_bulk_load: Option<String>,
}

/// Recording [`StoreBackend`] for tests
#[derive(Debug)]
pub struct MemoryBackend {
    accounts: Vec<String>,
    state: Mutex<State>,
}

impl MemoryBackend {
    /// Create a backend recognizing the given account names
    pub fn new(accounts: &[&str]) -> Self {
        Self {
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            state: Mutex::new(State {
                next_transaction_id: 1,
                next_zero_record_id: 1,
                next_split_id: 1,
                ..State::default()
            }),
        }
    }

    /// Make the next bulk load into `table` fail
    pub fn fail_bulk_load(&self, table: &str) {
        self.state.lock().unwrap().fail_bulk_load = Some(table.to_string());
    }

    /// Directly inserted transactions, in call order
    pub fn transactions(&self) -> Vec<(TransactionId, TransactionRow)> {
        self.state.lock().unwrap().transactions.clone()
    }

    /// Directly inserted zero records, in call order
    pub fn zero_records(&self) -> Vec<(ZeroRecordId, ZeroRecordRow)> {
        self.state.lock().unwrap().zero_records.clone()
    }

    /// Directly inserted splits, in call order
    pub fn splits(&self) -> Vec<SplitRow> {
        self.state.lock().unwrap().splits.clone()
    }

    /// Rows staged by `bulk_load_transactions`
    pub fn staged_transactions(&self) -> Vec<(TransactionId, TransactionRow)> {
        self.state.lock().unwrap().staged_transactions.clone()
    }

    /// Rows staged by `bulk_load_zero_records`
    pub fn staged_zero_records(&self) -> Vec<(ZeroRecordId, ZeroRecordRow)> {
        self.state.lock().unwrap().staged_zero_records.clone()
    }

    /// Rows staged by `bulk_load_splits`
    pub fn staged_splits(&self) -> Vec<SplitRow> {
        self.state.lock().unwrap().staged_splits.clone()
    }

    /// Run-bracketing calls observed, in order
    pub fn bracket_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().bracket_calls.clone()
    }

    /// Whether the consolidating call ran
    pub fn consolidated(&self) -> bool {
        self.state.lock().unwrap().consolidated
    }

    /// Total persisted rows across tables and staging
    pub fn total_rows(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.transactions.len()
            + state.zero_records.len()
            + state.splits.len()
            + state.staged_transactions.len()
            + state.staged_zero_records.len()
            + state.staged_splits.len()
    }

    fn check_bulk_failure(&self, table: &str) -> Result<(), ImportError> {
        let state = self.state.lock().unwrap();
        match &state.fail_bulk_load {
            Some(t) if t == table => Err(ImportError::bulk_load(table, "injected failure")),
            _ => Ok(()),
        }
    }
}

impl StoreBackend for MemoryBackend {
    async fn account_names(&self) -> Result<Vec<String>, ImportError> {
        Ok(self.accounts.clone())
    }

    async fn clear_transactions(&self) -> Result<(), ImportError> {
        let mut state = self.state.lock().unwrap();
        state.transactions.clear();
        state.zero_records.clear();
        state.splits.clear();
        state.bracket_calls.push("clear_transactions".to_string());
        Ok(())
    }

    async fn extend_switchover_date(&self) -> Result<(), ImportError> {
        self.state
            .lock()
            .unwrap()
            .bracket_calls
            .push("extend_switchover_date".to_string());
        Ok(())
    }

    async fn extend_categories(&self) -> Result<(), ImportError> {
        self.state
            .lock()
            .unwrap()
            .bracket_calls
            .push("extend_categories".to_string());
        Ok(())
    }

    async fn insert_transaction(
        &self,
        row: &TransactionRow,
    ) -> Result<TransactionId, ImportError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_transaction_id;
        state.next_transaction_id += 1;
        state.transactions.push((id, row.clone()));
        Ok(id)
    }

    async fn insert_zero_record(&self, row: &ZeroRecordRow) -> Result<ZeroRecordId, ImportError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_zero_record_id;
        state.next_zero_record_id += 1;
        state.zero_records.push((id, row.clone()));
        Ok(id)
    }

    async fn insert_split(&self, row: &SplitRow) -> Result<SplitId, ImportError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_split_id;
        state.next_split_id += 1;
        state.splits.push(row.clone());
        Ok(id)
    }

    async fn bulk_load_transactions(
        &self,
        rows: &[(TransactionId, TransactionRow)],
    ) -> Result<(), ImportError> {
        self.check_bulk_failure("AccountTransaction")?;
        self.state
            .lock()
            .unwrap()
            .staged_transactions
            .extend_from_slice(rows);
        Ok(())
    }

    async fn bulk_load_zero_records(
        &self,
        rows: &[(ZeroRecordId, ZeroRecordRow)],
    ) -> Result<(), ImportError> {
        self.check_bulk_failure("ZeroRecord")?;
        self.state
            .lock()
            .unwrap()
            .staged_zero_records
            .extend_from_slice(rows);
        Ok(())
    }

    async fn bulk_load_splits(&self, rows: &[SplitRow]) -> Result<(), ImportError> {
        self.check_bulk_failure("TransactionSplit")?;
        self.state
            .lock()
            .unwrap()
            .staged_splits
            .extend_from_slice(rows);
        Ok(())
    }

    async fn consolidate(&self) -> Result<(), ImportError> {
        self.state.lock().unwrap().consolidated = true;
        Ok(())
    }
}
