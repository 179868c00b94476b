//! The in-progress record accumulator and parent references
//!
//! A QIF record is the set of directive lines between two `^` terminators.
//! [`PendingRecord`] accumulates those fields as they arrive; the resolver
//! mutates exactly one field per directive and resets the whole value after
//! each terminator.

use chrono::NaiveDate;

/// Surrogate or store-assigned identifier for a transaction row
pub type TransactionId = i64;

/// Surrogate or store-assigned identifier for a zero-record row
pub type ZeroRecordId = i64;

/// Store-assigned identifier for a split row
pub type SplitId = i64;

/// The description payload that switches the parent kind
///
/// A record whose `P` directive carries exactly this value anchors its splits
/// to a zero record (a dated placeholder with no amount of its own) instead
/// of a transaction. Used for balance-adjustment entries.
pub const ZERO_RECORD_SENTINEL: &str = "Zero Record";

/// Reference to the parent row a record's splits attach to
///
/// The parent kind is decided once, at materialization time, from the
/// sentinel description — never by re-comparing strings at each split. A
/// record has at most one parent for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// Splits attach to a full transaction row
    Transaction(TransactionId),
    /// Splits attach to a zero-record anchor
    ZeroRecord(ZeroRecordId),
}

/// Mutable accumulator for the record currently being read
///
/// One live instance exists per account stream. Amounts are kept as
/// comma-stripped strings until a persisted row is built, so no precision is
/// lost before the decimal boundary; an empty string means "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRecord {
    /// Transaction date from the `D` directive, unset until one is seen
    pub transaction_date: Option<NaiveDate>,

    /// Record total amount (`U`), comma-stripped; empty = unset
    pub amount: String,

    /// Set by `C` payload `X`
    pub reconciled: bool,

    /// Set by `C` payload `*`
    pub cleared: bool,

    /// Payee / free-text description (`P`); the sentinel value selects the
    /// zero-record parent kind
    pub description: String,

    /// Memo (`M`), backticks stripped
    pub memo: String,

    /// Check number (content-mode `N`), backticks stripped
    pub check_number: String,

    /// Category for the next split to start (`L` or the previous `S`)
    pub category: String,

    /// Description of the pending split (`E`)
    pub split_description: String,

    /// Amount of the pending split (`$`), comma-stripped
    ///
    /// Non-empty means a split is owed and not yet written; the resolver
    /// clears it immediately after every flush.
    pub split_amount: String,

    /// Parent row created for this record, if any
    ///
    /// `None` until the first `S` or the terminator lazily materializes the
    /// parent.
    pub parent: Option<ParentRef>,
}

impl PendingRecord {
    /// Whether this record's parent should be a zero record
    pub fn is_zero_record(&self) -> bool {
        self.description == ZERO_RECORD_SENTINEL
    }

    /// Whether a split is owed and not yet written
    pub fn has_pending_split(&self) -> bool {
        !self.split_amount.is_empty()
    }

    /// Reset every field to its unset state
    ///
    /// Runs after each terminator and on every account switch.
    pub fn reset(&mut self) {
        *self = PendingRecord::default();
    }
}
