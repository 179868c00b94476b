//! Persisted row types
//!
//! These are the entities the persistence boundary writes: a transaction, a
//! zero record, and a split attached to exactly one of them. Rows are built
//! once by the resolver, written once (direct mode) or buffered once and
//! flushed once (batch mode), and never mutated afterward.
//!
//! Amounts cross the boundary as [`Decimal`]; the conversion from the
//! accumulator's comma-stripped strings happens in the resolver, and a value
//! that fails to parse aborts the run.

use super::record::ParentRef;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A full transaction row
///
/// Created at most once per record, when the first `S` directive or the
/// terminator materializes the parent and the description is not the
/// zero-record sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRow {
    /// Name of the account the transaction belongs to
    pub account: String,
    /// Transaction date; the store accepts a missing date as NULL
    pub date: Option<NaiveDate>,
    /// Free-text payee / description
    pub description: String,
    /// Signed total amount
    pub amount: Decimal,
    /// Reconciled flag (`C` payload `X`)
    pub reconciled: bool,
    /// Cleared flag (`C` payload `*`)
    pub cleared: bool,
    /// Check number, backticks stripped
    pub check_number: String,
    /// Memo, backticks stripped
    pub memo: String,
}

/// A zero-record row: a dated anchor with no amount or description
///
/// Splits attach to it instead of a transaction; used for balance-adjustment
/// entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroRecordRow {
    /// Name of the account the anchor belongs to
    pub account: String,
    /// Reference date for the anchor
    pub reference_date: Option<NaiveDate>,
}

/// A category split attached to exactly one parent row
///
/// Zero or more per parent in the input; the terminator guarantees every
/// materialized parent ends up with at least one (synthesizing a default
/// split over the full record amount when none was declared).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRow {
    /// The transaction or zero record this split belongs to
    pub parent: ParentRef,
    /// Category label; may be empty
    pub category: String,
    /// Signed split amount
    pub amount: Decimal,
    /// Reference date, copied from the record's transaction date
    pub reference_date: Option<NaiveDate>,
    /// Free-text split description; may be empty
    pub description: String,
}
