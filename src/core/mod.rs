//! Core import pipeline: account tracking, record resolution, run driving

pub mod account;
pub mod resolver;
pub mod runner;

pub use account::{AccountContext, AccountStats, AccountSummary};
pub use resolver::RecordResolver;
pub use runner::{export_file_name, process_files, source_files, RunSummary, SourceFile};
