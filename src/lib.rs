//! QIF Import Engine Library
//! # Overview
//!
//! This library provides a streaming QIF-based import pipeline that turns
//! line-oriented export files into transactions, zero records, and splits in
//! a SQLite database, with two interchangeable persistence strategies.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (PendingRecord, TransactionRow, etc.)
//! - [`cli`] - CLI argument parsing
//! - [`io`] - QIF tokenizing and buffered line reading
//! - [`core`] - Business logic components:
//!   - [`core::resolver`] - Directive-driven record state machine
//!   - [`core::account`] - Current-account tracking and progress counters
//!   - [`core::runner`] - File derivation and the per-file read loop
//! - [`store`] - Persistence seams: [`store::RecordSink`] sinks
//!   (direct and batch) over a [`store::StoreBackend`]
//! - [`strategy`] - Run orchestration for the two persistence strategies
//!
//! # Record Model
//!
//! A QIF record is a run of one-letter directive lines ended by `^`. Each
//! record becomes exactly one parent row plus one or more splits:
//!
//! - **Transaction**: the normal case, carrying date, amount, payee,
//!   reconciliation flags, check number, and memo
//! - **Zero record**: a categorization-only anchor, selected when the payee
//!   line carries the sentinel description
//! - **Splits**: category/amount breakdowns under either parent; a record
//!   with no explicit splits gets one default split over its full amount
//!
//! # Persistence Strategies
//!
//! - **direct**: one store round trip per row, identifiers assigned by the
//!   store as rows are written
//! - **batch**: rows buffered in memory under local identifiers, bulk-loaded
//!   concurrently at the end of the run, then consolidated into the final
//!   tables with identifiers re-linked

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod store;
pub mod strategy;
pub mod types;

pub use crate::core::{process_files, RecordResolver, RunSummary};
pub use store::{BatchSink, DirectSink, RecordSink, SqliteBackend, StoreBackend};
pub use strategy::{create_strategy, ImportStrategy, RunOptions, StrategyKind};
pub use types::{
    ImportError, ParentRef, PendingRecord, SplitRow, TransactionRow, ZeroRecordRow,
};
