//! Split/transaction resolver
//!
//! The core algorithm of the import: decides, at each directive, whether to
//! lazily materialize a parent row (a transaction or a zero record), flush a
//! pending split, or synthesize the default split at terminator time.
//!
//! # Record lifecycle
//!
//! Field directives (`D`, `U`, `C`, `P`, `M`, `L`, `N`, `E`, `$`) each
//! mutate exactly one field of the [`PendingRecord`]. The lifecycle
//! transitions hang off two codes:
//!
//! - `S` (split start): materialize the parent if this record has none yet —
//!   a zero record when the description carries the sentinel value, a
//!   transaction otherwise — then flush any pending split against it and
//!   remember the new category.
//! - `^` (terminator): materialize the parent if none exists (covers records
//!   with no `S` line at all), synthesize the default split over the full
//!   record amount when no explicit split amount is pending, flush exactly
//!   one split, and reset the whole record.
//!
//! Lazy materialization means records for unrecognized accounts, and
//! partially-read records, never produce placeholder rows. Because every
//! materialized parent flushes at least one split at the terminator,
//! downstream consumers never see a parent with no splits.
//!
//! The resolver talks to storage only through [`RecordSink`], so the
//! persistence strategy is swappable without touching any of this logic.

use crate::core::account::AccountContext;
use crate::io::qif_format::{parse_qif_date, strip_backticks, strip_commas, RawDirective};
use crate::store::RecordSink;
use crate::types::{
    ImportError, ParentRef, PendingRecord, SplitRow, TransactionRow, ZeroRecordRow,
};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Directive-driven record state machine
#[derive(Debug, Default)]
pub struct RecordResolver {
    record: PendingRecord,
}

impl RecordResolver {
    /// Create a resolver with an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// The record currently being accumulated
    pub fn record(&self) -> &PendingRecord {
        &self.record
    }

    /// Discard any partially accumulated record
    ///
    /// Called on account switches; `^` already resets on its own.
    pub fn reset(&mut self) {
        self.record.reset();
    }

    /// Process one directive
    ///
    /// Header bookkeeping (`!`, and `N` inside a header block) is always
    /// handled. Everything else is a content directive and is silently
    /// skipped while in header mode or while the current account is not
    /// recognized.
    ///
    /// # Errors
    ///
    /// Malformed date payloads fail immediately; malformed amounts fail when
    /// the row carrying them is built. Store errors propagate from the sink.
    /// All are fatal to the run.
    pub async fn apply<S: RecordSink>(
        &mut self,
        directive: &RawDirective,
        ctx: &mut AccountContext<'_>,
        sink: &mut S,
    ) -> Result<(), ImportError> {
        match directive.code {
            '!' => {
                ctx.set_header_mode(directive.payload == "Account");
                return Ok(());
            }
            'N' if ctx.header_mode() => {
                ctx.begin_account(&directive.payload);
                self.record.reset();
                return Ok(());
            }
            _ => {}
        }

        if ctx.header_mode() || !ctx.is_valid() {
            return Ok(());
        }

        match directive.code {
            'D' => self.record.transaction_date = Some(parse_qif_date(&directive.payload)?),
            'U' => self.record.amount = strip_commas(&directive.payload),
            'T' => {} // same value as U, already captured
            'C' => match directive.payload.as_str() {
                "X" => self.record.reconciled = true,
                "*" => self.record.cleared = true,
                _ => {}
            },
            'P' => self.record.description = directive.payload.clone(),
            'M' => self.record.memo = strip_backticks(&directive.payload),
            'L' => self.record.category = directive.payload.clone(),
            'N' => self.record.check_number = strip_backticks(&directive.payload),
            'E' => self.record.split_description = directive.payload.clone(),
            '$' => self.record.split_amount = strip_commas(&directive.payload),
            'S' => {
                self.materialize_parent(ctx, sink).await?;
                if self.record.has_pending_split() {
                    self.flush_split(ctx, sink).await?;
                }
                self.record.category = directive.payload.clone();
            }
            '^' => {
                self.materialize_parent(ctx, sink).await?;
                if !self.record.has_pending_split() {
                    // no explicit split: the default split absorbs the whole
                    // record amount under whatever category was last set
                    self.record.split_amount = self.record.amount.clone();
                }
                self.flush_split(ctx, sink).await?;
                self.record.reset();
            }
            _ => {} // unrecognized codes are ignored
        }

        Ok(())
    }

    /// Create the parent row for this record if none exists yet
    ///
    /// The parent kind is decided here, once, from the sentinel description.
    async fn materialize_parent<S: RecordSink>(
        &mut self,
        ctx: &mut AccountContext<'_>,
        sink: &mut S,
    ) -> Result<ParentRef, ImportError> {
        if let Some(parent) = self.record.parent {
            return Ok(parent);
        }

        let parent = if self.record.is_zero_record() {
            let id = sink
                .create_zero_record(ZeroRecordRow {
                    account: ctx.account_name().to_string(),
                    reference_date: self.record.transaction_date,
                })
                .await?;
            ParentRef::ZeroRecord(id)
        } else {
            let id = sink
                .create_transaction(TransactionRow {
                    account: ctx.account_name().to_string(),
                    date: self.record.transaction_date,
                    description: self.record.description.clone(),
                    amount: parse_amount(&self.record.amount)?,
                    reconciled: self.record.reconciled,
                    cleared: self.record.cleared,
                    check_number: self.record.check_number.clone(),
                    memo: self.record.memo.clone(),
                })
                .await?;
            ParentRef::Transaction(id)
        };

        ctx.record_written();
        self.record.parent = Some(parent);
        Ok(parent)
    }

    /// Write the pending split and clear its fields
    async fn flush_split<S: RecordSink>(
        &mut self,
        ctx: &mut AccountContext<'_>,
        sink: &mut S,
    ) -> Result<(), ImportError> {
        let parent = self.record.parent.ok_or_else(|| ImportError::MissingParent {
            account: ctx.account_name().to_string(),
        })?;

        sink.create_split(SplitRow {
            parent,
            category: self.record.category.clone(),
            amount: parse_amount(&self.record.split_amount)?,
            reference_date: self.record.transaction_date,
            description: self.record.split_description.clone(),
        })
        .await?;

        self.record.category.clear();
        self.record.split_amount.clear();
        self.record.split_description.clear();
        Ok(())
    }
}

fn parse_amount(value: &str) -> Result<Decimal, ImportError> {
    Decimal::from_str(value).map_err(|_| ImportError::amount_parse(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::qif_format::tokenize;
    use crate::store::{DirectSink, MemoryBackend};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    /// Feed a newline-separated directive script through a fresh resolver.
    async fn run_script(
        backend: &MemoryBackend,
        known: &HashSet<String>,
        current_account: Option<&str>,
        script: &str,
    ) -> Result<(), ImportError> {
        let mut resolver = RecordResolver::new();
        let mut ctx = AccountContext::new(known);
        if let Some(account) = current_account {
            ctx.begin_account(account);
        }
        let mut sink = DirectSink::new(backend);

        for line in script.lines() {
            if let Some(directive) = tokenize(line) {
                resolver.apply(&directive, &mut ctx, &mut sink).await?;
            }
        }
        Ok(())
    }

    fn known(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[tokio::test]
    async fn test_plain_record_yields_transaction_and_synthetic_split() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU-50.00\nPStore\n^",
        )
        .await
        .unwrap();

        let transactions = backend.transactions();
        assert_eq!(transactions.len(), 1);
        let (id, row) = &transactions[0];
        assert_eq!(row.account, "Checking");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(row.description, "Store");
        assert_eq!(row.amount, dec("-50.00"));

        assert!(backend.zero_records().is_empty());

        let splits = backend.splits();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].parent, ParentRef::Transaction(*id));
        assert_eq!(splits[0].amount, dec("-50.00"));
        assert_eq!(splits[0].category, "");
    }

    #[tokio::test]
    async fn test_zero_record_sentinel_switches_parent_kind() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU100.00\nPZero Record\nLCatA\n$100.00\n^",
        )
        .await
        .unwrap();

        assert!(backend.transactions().is_empty());
        let zero_records = backend.zero_records();
        assert_eq!(zero_records.len(), 1);
        let (id, row) = &zero_records[0];
        assert_eq!(row.reference_date, NaiveDate::from_ymd_opt(2024, 1, 2));

        let splits = backend.splits();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].parent, ParentRef::ZeroRecord(*id));
        assert_eq!(splits[0].category, "CatA");
        assert_eq!(splits[0].amount, dec("100.00"));
    }

    #[tokio::test]
    async fn test_multi_split_record_flushes_each_split() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU50.00\nPStore\nSCatA\nEfirst half\n$30.00\nSCatB\n$20.00\n^",
        )
        .await
        .unwrap();

        let transactions = backend.transactions();
        assert_eq!(transactions.len(), 1);

        let splits = backend.splits();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].category, "CatA");
        assert_eq!(splits[0].amount, dec("30.00"));
        assert_eq!(splits[0].description, "first half");
        assert_eq!(splits[1].category, "CatB");
        assert_eq!(splits[1].amount, dec("20.00"));
        assert_eq!(splits[1].description, "");
    }

    #[tokio::test]
    async fn test_first_split_may_start_from_a_bare_category_line() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        // L plus $ opens the first split without any S directive; the S that
        // follows flushes it and starts the second
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU50.00\nPStore\nLCatA\n$30.00\nSCatB\n$20.00\n^",
        )
        .await
        .unwrap();

        assert_eq!(backend.transactions().len(), 1);
        let splits = backend.splits();
        assert_eq!(splits.len(), 2);
        assert_eq!((splits[0].category.as_str(), splits[0].amount), ("CatA", dec("30.00")));
        assert_eq!((splits[1].category.as_str(), splits[1].amount), ("CatB", dec("20.00")));
    }

    #[tokio::test]
    async fn test_parent_is_created_once_across_many_splits() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU60.00\nPStore\nSCatA\n$20.00\nSCatB\n$20.00\nSCatC\n$20.00\n^",
        )
        .await
        .unwrap();

        assert_eq!(backend.transactions().len(), 1);
        assert_eq!(backend.splits().len(), 3);
    }

    #[tokio::test]
    async fn test_unrecognized_account_produces_no_rows() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        run_script(
            &backend,
            &accounts,
            Some("Old Closed Card"),
            "D1/2'24\nU25.00\nPStore\nSCatA\n$25.00\n^",
        )
        .await
        .unwrap();

        assert_eq!(backend.total_rows(), 0);
    }

    #[tokio::test]
    async fn test_header_block_switches_account_and_resumes_content() {
        let backend = MemoryBackend::new(&["Checking", "Savings"]);
        let accounts = known(&["Checking", "Savings"]);
        // combined-file shape: header block per account, then its records
        run_script(
            &backend,
            &accounts,
            None,
            "!Account\nNChecking\nTBank\n^\n!Type:Bank\n\
             D1/2'24\nU10.00\nPFirst\n^\n\
             !Account\nNSavings\nTBank\n^\n!Type:Bank\n\
             D1/3'24\nU20.00\nPSecond\n^",
        )
        .await
        .unwrap();

        let transactions = backend.transactions();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].1.account, "Checking");
        assert_eq!(transactions[1].1.account, "Savings");
    }

    #[tokio::test]
    async fn test_header_terminator_does_not_create_rows() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        // the `^` inside the !Account block is part of the header, not a record
        run_script(&backend, &accounts, None, "!Account\nNChecking\nTBank\n^")
            .await
            .unwrap();
        assert_eq!(backend.total_rows(), 0);
    }

    #[tokio::test]
    async fn test_clear_state_flags_accumulate_and_last_write_wins() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        // both flags set over the record's lifetime; unknown payload ignored
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU5.00\nCX\nC*\nC?\nPStore\n^",
        )
        .await
        .unwrap();

        let (_, row) = &backend.transactions()[0];
        assert!(row.reconciled);
        assert!(row.cleared);
    }

    #[tokio::test]
    async fn test_duplicate_t_amount_is_ignored() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU1,234.56\nT1,234.56\nPStore\n^",
        )
        .await
        .unwrap();

        let (_, row) = &backend.transactions()[0];
        assert_eq!(row.amount, dec("1234.56"));
    }

    #[tokio::test]
    async fn test_backticks_stripped_from_memo_and_check_number() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU5.00\nN17`04\nMwith `escapes`\nPStore\n^",
        )
        .await
        .unwrap();

        let (_, row) = &backend.transactions()[0];
        assert_eq!(row.check_number, "1704");
        assert_eq!(row.memo, "with escapes");
    }

    #[tokio::test]
    async fn test_stale_category_carries_into_default_split() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        // L after the last S leaves `category` set when the terminator
        // synthesizes nothing (a split is pending), but a bare L with no $
        // leaves the default split attributed to it on the NEXT record only
        // if state leaked. Verify the reset prevents that.
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU5.00\nLCatA\nPStore\n^\nD1/3'24\nU6.00\nPNext\n^",
        )
        .await
        .unwrap();

        let splits = backend.splits();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].category, "CatA");
        // second record saw no L: category must not leak across the reset
        assert_eq!(splits[1].category, "");
    }

    #[tokio::test]
    async fn test_terminator_resets_everything() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        let mut resolver = RecordResolver::new();
        let mut ctx = AccountContext::new(&accounts);
        ctx.begin_account("Checking");
        let mut sink = DirectSink::new(&backend);

        for line in "D1/2'24\nU5.00\nCX\nPStore\nMnote\nN12\n^".lines() {
            let directive = tokenize(line).unwrap();
            resolver.apply(&directive, &mut ctx, &mut sink).await.unwrap();
        }

        assert_eq!(resolver.record(), &PendingRecord::default());
    }

    #[tokio::test]
    async fn test_malformed_amount_is_fatal() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        let err = run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nUtwelve\nPStore\n^",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ImportError::AmountParse { .. }));
    }

    #[tokio::test]
    async fn test_malformed_date_is_fatal_even_before_terminator() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        let err = run_script(&backend, &accounts, Some("Checking"), "D13/45'XX\n")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::DateParse { .. }));
    }

    #[tokio::test]
    async fn test_malformed_content_in_invalid_account_is_skipped() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        // invalid account: even malformed payloads are silently skipped
        run_script(&backend, &accounts, Some("Nope"), "D13/45'XX\nUtwelve\n^")
            .await
            .unwrap();
        assert_eq!(backend.total_rows(), 0);
    }

    #[tokio::test]
    async fn test_explicit_split_amount_survives_terminator_unchanged() {
        let backend = MemoryBackend::new(&["Checking"]);
        let accounts = known(&["Checking"]);
        // pending split at terminator time keeps its own amount; split sums
        // are not reconciled against the record total
        run_script(
            &backend,
            &accounts,
            Some("Checking"),
            "D1/2'24\nU50.00\nPStore\nSCatA\n$30.00\nSCatB\n$15.00\n^",
        )
        .await
        .unwrap();

        let splits = backend.splits();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].amount + splits[1].amount, dec("45.00"));
    }
}
