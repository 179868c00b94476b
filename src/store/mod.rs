//! Persistence boundary
//!
//! This module defines the two trait seams the rest of the crate writes
//! through, plus their implementations:
//!
//! - [`RecordSink`] - the contract the resolver persists entities through.
//!   Two interchangeable implementations exist: [`DirectSink`] (one store
//!   round trip per row, store-assigned identifiers) and [`BatchSink`]
//!   (local surrogate identifiers, in-memory buffers, one bulk load plus a
//!   consolidating call at the end of the run).
//! - [`StoreBackend`] - the remote store itself: insert procedures,
//!   run-bracketing calls, bulk loads, and the consolidating step.
//!   [`SqliteBackend`] is the shipped backend; [`MemoryBackend`] records
//!   every call for tests.
//!
//! The resolver never talks to a backend directly — only through
//! [`RecordSink`] — so the strategy is swappable without touching parsing
//! logic.

pub mod backend;
pub mod batch;
pub mod direct;
pub mod memory;
pub mod sqlite;

pub use backend::StoreBackend;
pub use batch::BatchSink;
pub use direct::DirectSink;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::types::{ImportError, SplitRow, TransactionId, TransactionRow, ZeroRecordId, ZeroRecordRow};

/// Contract the resolver persists accounting entities through
///
/// Within one record the parent row is always assigned an identifier (local
/// or remote) before any split referencing it is created; implementations
/// may rely on that ordering. `finalize` is called exactly once, after the
/// last file of the run.
#[allow(async_fn_in_trait)]
pub trait RecordSink {
    /// Persist a transaction row, returning its identifier
    async fn create_transaction(&mut self, row: TransactionRow)
        -> Result<TransactionId, ImportError>;

    /// Persist a zero-record row, returning its identifier
    async fn create_zero_record(&mut self, row: ZeroRecordRow)
        -> Result<ZeroRecordId, ImportError>;

    /// Persist a split row attached to an already-identified parent
    async fn create_split(&mut self, row: SplitRow) -> Result<(), ImportError>;

    /// Complete the run
    ///
    /// A no-op for the direct sink; the batch sink performs its bulk loads
    /// and the consolidating store call here.
    async fn finalize(&mut self) -> Result<(), ImportError>;
}
