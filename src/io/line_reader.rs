//! Asynchronous line reader with a directive interface
//!
//! Streams one QIF export file line by line, yielding a [`RawDirective`] per
//! non-empty line. Delegates format concerns to the [`qif_format`] module.
//!
//! # Design
//!
//! The reader wraps a buffered `tokio::fs::File`, so memory use is constant
//! regardless of file size. Lines are consumed strictly in order — record
//! state is sequential and order-dependent, so there is no batch interface.
//!
//! # Error Handling
//!
//! - A file that cannot be opened surfaces as [`ImportError::FileOpen`] from
//!   [`LineReader::open`]; the run driver treats that as recoverable and
//!   skips the file.
//! - Read errors after a successful open are fatal [`ImportError::Io`].
//!
//! [`qif_format`]: crate::io::qif_format

use crate::io::qif_format::{tokenize, RawDirective};
use crate::types::ImportError;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// Streaming reader over one QIF source file
pub struct LineReader {
    lines: Lines<BufReader<File>>,
    line_num: u64,
}

impl LineReader {
    /// Open a QIF file for streaming
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::FileOpen`] with the path and the underlying
    /// message when the file cannot be opened.
    pub async fn open(path: &Path) -> Result<Self, ImportError> {
        let file = File::open(path)
            .await
            .map_err(|e| ImportError::file_open(&path.display().to_string(), &e))?;

        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_num: 0,
        })
    }

    /// Read the next directive, skipping empty lines
    ///
    /// Returns `Ok(None)` at end of file.
    pub async fn next_directive(&mut self) -> Result<Option<RawDirective>, ImportError> {
        loop {
            match self.lines.next_line().await? {
                Some(line) => {
                    self.line_num += 1;
                    if let Some(directive) = tokenize(&line) {
                        return Ok(Some(directive));
                    }
                    // blank line, keep going
                }
                None => return Ok(None),
            }
        }
    }

    /// Number of physical lines consumed so far
    pub fn line_num(&self) -> u64 {
        self.line_num
    }
}
