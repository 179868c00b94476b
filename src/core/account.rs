//! Account context tracking
//!
//! Tracks which account is "current" for an input stream, whether it belongs
//! to the recognized account set, whether the stream is inside an `!Account`
//! header block, and the per-account progress counters exposed for
//! reporting. Counters and validity are re-evaluated on every account
//! switch.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

/// Per-account progress counters
///
/// Observational only — not part of the persistence contract.
#[derive(Debug, Clone)]
pub struct AccountStats {
    /// Content-mode lines processed for this account
    pub lines_processed: u64,
    /// Parent rows (transactions and zero records) written
    pub records_written: u64,
    started: Instant,
}

impl AccountStats {
    fn new() -> Self {
        Self {
            lines_processed: 0,
            records_written: 0,
            started: Instant::now(),
        }
    }
}

/// Final counters for one processed account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    /// Account name
    pub account: String,
    /// Content-mode lines processed
    pub lines_processed: u64,
    /// Parent rows written
    pub records_written: u64,
    /// Wall-clock time spent on this account
    pub elapsed: Duration,
}

impl fmt::Display for AccountSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.elapsed.as_secs();
        let rate = if total_secs == 0 {
            "---".to_string()
        } else {
            format!(
                "{:.1}",
                self.records_written as f64 / total_secs as f64
            )
        };
        write!(
            f,
            "Account: {}, Lines processed: {}, Transactions processed: {}, \
             Elapsed time: {}:{:02}, {:>5} txn/s",
            self.account,
            self.lines_processed,
            self.records_written,
            total_secs / 60,
            total_secs % 60,
            rate,
        )
    }
}

/// Tracker for the current account of one input stream
///
/// Holds the recognized-account set (read once at run start, never mutated)
/// by reference; each account switch re-evaluates membership. The stream
/// starts with no current account, so content directives are suppressed
/// until the first switch.
#[derive(Debug)]
pub struct AccountContext<'a> {
    known_accounts: &'a HashSet<String>,
    account_name: String,
    valid: bool,
    header_mode: bool,
    active: bool,
    stats: AccountStats,
    completed: Vec<AccountSummary>,
}

impl<'a> AccountContext<'a> {
    /// Create a context with no current account
    pub fn new(known_accounts: &'a HashSet<String>) -> Self {
        Self {
            known_accounts,
            account_name: String::new(),
            valid: false,
            header_mode: false,
            active: false,
            stats: AccountStats::new(),
            completed: Vec::new(),
        }
    }

    /// Switch to a new current account
    ///
    /// Finishes the previous account's counters (if any), resets the stats,
    /// and re-evaluates validity against the recognized set.
    pub fn begin_account(&mut self, name: &str) {
        self.finish_current();
        self.account_name = name.to_string();
        self.valid = self.known_accounts.contains(name);
        self.active = true;
        self.stats = AccountStats::new();
    }

    /// Name of the current account (empty before the first switch)
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Whether the current account is in the recognized set
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the stream is inside an `!Account` header block
    pub fn header_mode(&self) -> bool {
        self.header_mode
    }

    /// Enter or exit header mode
    pub fn set_header_mode(&mut self, header_mode: bool) {
        self.header_mode = header_mode;
    }

    /// Whether the line just handled counts as a processed content line
    pub fn counts_content_line(&self) -> bool {
        !self.header_mode && self.valid
    }

    /// Record one processed content line
    pub fn line_processed(&mut self) {
        self.stats.lines_processed += 1;
    }

    /// Record one materialized parent row
    pub fn record_written(&mut self) {
        self.stats.records_written += 1;
    }

    /// Current counters (for progress reporting)
    pub fn stats(&self) -> &AccountStats {
        &self.stats
    }

    fn finish_current(&mut self) {
        if self.active {
            self.completed.push(AccountSummary {
                account: self.account_name.clone(),
                lines_processed: self.stats.lines_processed,
                records_written: self.stats.records_written,
                elapsed: self.stats.started.elapsed(),
            });
        }
    }

    /// Finish the current account and return every summary in switch order
    pub fn into_summaries(mut self) -> Vec<AccountSummary> {
        self.finish_current();
        self.completed
    }
}
