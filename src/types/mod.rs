//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `record`: the in-progress record accumulator and parent references
//! - `entity`: persisted row types (transaction, zero record, split)
//! - `error`: error types for the import engine

pub mod entity;
pub mod error;
pub mod record;

pub use entity::{SplitRow, TransactionRow, ZeroRecordRow};
pub use error::ImportError;
pub use record::{
    ParentRef, PendingRecord, SplitId, TransactionId, ZeroRecordId, ZERO_RECORD_SENTINEL,
};
