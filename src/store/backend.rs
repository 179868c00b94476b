//! Remote store boundary
//!
//! Everything the import engine needs from the backing store, expressed as
//! one trait so the SQLite reference backend and the in-memory test backend
//! interchange freely. Methods take `&self` so batch-mode finalize can run
//! the three bulk loads concurrently against one backend; implementations
//! use interior mutability.

use crate::types::{
    ImportError, SplitId, SplitRow, TransactionId, TransactionRow, ZeroRecordId, ZeroRecordRow,
};

/// Boundary operations against the backing store
///
/// Grouped by when they run:
/// - once per run, before any file: [`account_names`], [`clear_transactions`],
///   [`extend_switchover_date`], [`extend_categories`]
/// - per entity in direct mode: the three `insert_*` calls, each a blocking
///   round trip returning the store-assigned identifier
/// - once at batch-mode finalize: the three `bulk_load_*` calls (independent
///   tables, may run concurrently) followed by [`consolidate`], which
///   translates the local surrogate identifiers carried by the staged rows
///   into final ones
///
/// [`account_names`]: StoreBackend::account_names
/// [`clear_transactions`]: StoreBackend::clear_transactions
/// [`extend_switchover_date`]: StoreBackend::extend_switchover_date
/// [`extend_categories`]: StoreBackend::extend_categories
/// [`consolidate`]: StoreBackend::consolidate
#[allow(async_fn_in_trait)]
pub trait StoreBackend {
    /// Fetch the recognized account names
    ///
    /// Read once at run start; records for accounts outside this set are
    /// never materialized.
    async fn account_names(&self) -> Result<Vec<String>, ImportError>;

    /// Clear all previously imported rows
    ///
    /// Runs once before any file is processed, making a full re-import
    /// idempotent.
    async fn clear_transactions(&self) -> Result<(), ImportError>;

    /// Extend the legacy switchover date
    ///
    /// Maintenance call: as long as imports still run, the switchover window
    /// keeps moving forward.
    async fn extend_switchover_date(&self) -> Result<(), ImportError>;

    /// Extend the category validity window
    async fn extend_categories(&self) -> Result<(), ImportError>;

    /// Insert one transaction row, returning the store-assigned id
    async fn insert_transaction(&self, row: &TransactionRow)
        -> Result<TransactionId, ImportError>;

    /// Insert one zero-record row, returning the store-assigned id
    async fn insert_zero_record(&self, row: &ZeroRecordRow)
        -> Result<ZeroRecordId, ImportError>;

    /// Insert one split row, returning the store-assigned id
    async fn insert_split(&self, row: &SplitRow) -> Result<SplitId, ImportError>;

    /// Stage a whole run's transaction rows keyed by local surrogate id
    async fn bulk_load_transactions(
        &self,
        rows: &[(TransactionId, TransactionRow)],
    ) -> Result<(), ImportError>;

    /// Stage a whole run's zero-record rows keyed by local surrogate id
    async fn bulk_load_zero_records(
        &self,
        rows: &[(ZeroRecordId, ZeroRecordRow)],
    ) -> Result<(), ImportError>;

    /// Stage a whole run's split rows
    ///
    /// Parent references inside the rows are local surrogate ids; the
    /// consolidating step re-links them.
    async fn bulk_load_splits(&self, rows: &[SplitRow]) -> Result<(), ImportError>;

    /// Move staged rows into the final tables, translating surrogate ids
    async fn consolidate(&self) -> Result<(), ImportError>;
}
