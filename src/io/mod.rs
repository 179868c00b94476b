//! I/O module
//!
//! Handles QIF line parsing and file streaming.
//!
//! # Components
//!
//! - `qif_format` - QIF format handling (tokenizing, date/amount payload parsing)
//! - `line_reader` - Asynchronous line reader yielding directives

pub mod line_reader;
pub mod qif_format;

pub use line_reader::LineReader;
pub use qif_format::{parse_qif_date, strip_backticks, strip_commas, tokenize, RawDirective};
