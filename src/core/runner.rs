//! Run driver
//!
//! Derives the list of export files to read from the recognized account set,
//! then streams each file through the resolver into the active sink. A file
//! that cannot be opened is reported and skipped; every other failure aborts
//! the run.

use crate::core::account::{AccountContext, AccountSummary};
use crate::core::resolver::RecordResolver;
use crate::io::line_reader::LineReader;
use crate::store::RecordSink;
use crate::types::ImportError;
use std::collections::HashSet;
use std::path::Path;

/// Name of the single file read in combined mode
const COMBINED_EXPORT_FILE: &str = "all-export.qif";

/// One export file to be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Account the file belongs to; `None` for a combined export, where the
    /// accounts announce themselves via `!Account` header blocks
    pub account_name: Option<String>,
    /// File name relative to the export directory
    pub file_name: String,
}

/// Export file name for one account
///
/// Spaces are removed from the account name, matching how the exporting
/// tool names per-account files.
pub fn export_file_name(account: &str) -> String {
    format!("{}-export.qif", account.replace(' ', ""))
}

/// Derive the files a run will read
///
/// Per-account mode yields one file per recognized account; combined mode
/// yields a single multi-account file.
pub fn source_files(account_names: &[String], combine: bool) -> Vec<SourceFile> {
    if combine {
        return vec![SourceFile {
            account_name: None,
            file_name: COMBINED_EXPORT_FILE.to_string(),
        }];
    }
    account_names
        .iter()
        .map(|account| SourceFile {
            account_name: Some(account.clone()),
            file_name: export_file_name(account),
        })
        .collect()
}

/// Outcome of a run, for reporting
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Per-account counters, in processing order
    pub accounts: Vec<AccountSummary>,
    /// Files that could not be opened and were skipped
    pub skipped_files: Vec<String>,
}

/// Stream every source file through the resolver into `sink`
///
/// Each file gets a fresh resolver and account context; partial records
/// never leak across file boundaries. For a per-account file the account is
/// set up front; a combined file starts with no current account and relies
/// on its header blocks.
///
/// # Errors
///
/// Unopenable files are skipped (recorded in the summary, warned to
/// stderr). Read, parse, and store errors end the run.
pub async fn process_files<S: RecordSink>(
    dir: &Path,
    files: &[SourceFile],
    known_accounts: &HashSet<String>,
    sink: &mut S,
) -> Result<RunSummary, ImportError> {
    let mut summary = RunSummary::default();

    for file in files {
        let path = dir.join(&file.file_name);
        let mut reader = match LineReader::open(&path).await {
            Ok(reader) => reader,
            Err(err) if err.is_recoverable() => {
                eprintln!("warning: skipping {}: {err}", file.file_name);
                summary.skipped_files.push(file.file_name.clone());
                continue;
            }
            Err(err) => return Err(err),
        };

        let mut ctx = AccountContext::new(known_accounts);
        let mut resolver = RecordResolver::new();
        if let Some(account) = &file.account_name {
            ctx.begin_account(account);
        }

        while let Some(directive) = reader.next_directive().await? {
            resolver.apply(&directive, &mut ctx, sink).await?;
            if ctx.counts_content_line() {
                ctx.line_processed();
            }
        }

        summary.accounts.extend(ctx.into_summaries());
    }

    Ok(summary)
}
