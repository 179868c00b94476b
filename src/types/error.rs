//! Error types for the QIF import engine
//!
//! This module defines all error types that can occur while converting QIF
//! exports into accounting rows.
//!
//! # Error Categories
//!
//! - **File errors**: a source file that cannot be opened is the only
//!   recoverable fault — the run driver logs a warning and skips the file.
//! - **Format errors**: malformed date or amount payloads. These are fatal to
//!   the run; partial financial data is never silently persisted.
//! - **Store errors**: a failed round trip (direct mode), a failed bulk load
//!   (batch mode, surfaced with the offending table name), or a failed
//!   consolidation step. All fatal.

use thiserror::Error;

/// Main error type for the import engine
///
/// Each variant carries enough context to diagnose the failure from the
/// operator-facing message alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// A source QIF file could not be opened
    ///
    /// Recoverable: the run driver reports the file and continues with the
    /// remaining files.
    #[error("Error opening file {path}. Message: {message}")]
    FileOpen {
        /// Path that could not be opened
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// I/O error while reading an already-open file
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// A `D` directive payload did not match the `M/D'YY` format
    #[error("Invalid date payload '{value}'")]
    DateParse {
        /// The offending payload
        value: String,
    },

    /// An amount payload could not be parsed as a decimal
    ///
    /// Raised at the persistence boundary, where the comma-stripped string
    /// kept in the accumulator is converted to a `Decimal`.
    #[error("Invalid amount '{value}'")]
    AmountParse {
        /// The offending comma-stripped amount string
        value: String,
    },

    /// A split flush was attempted with no materialized parent
    ///
    /// Indicates a broken invariant in the resolver, not bad input: the
    /// parent row is always created before any split referencing it.
    #[error("Split flushed before a parent row was created for account '{account}'")]
    MissingParent {
        /// Account being processed when the invariant broke
        account: String,
    },

    /// A store round trip failed
    #[error("Store call '{operation}' failed: {message}")]
    Store {
        /// The boundary operation that failed
        operation: String,
        /// Underlying store message
        message: String,
    },

    /// A bulk load failed during batch-mode finalize
    #[error("Bulk load into table '{table}' failed: {message}")]
    BulkLoad {
        /// The table whose load failed
        table: String,
        /// Underlying store message
        message: String,
    },

    /// The consolidating step after the bulk loads failed
    #[error("Consolidation failed: {message}")]
    Consolidate {
        /// Underlying store message
        message: String,
    },

    /// Configuration could not be loaded (accounts seed file, runtime setup)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl From<std::io::Error> for ImportError {
    fn from(error: std::io::Error) -> Self {
        ImportError::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(error: serde_json::Error) -> Self {
        ImportError::Config {
            message: error.to_string(),
        }
    }
}

impl ImportError {
    /// Create a FileOpen error
    pub fn file_open(path: &str, error: &std::io::Error) -> Self {
        ImportError::FileOpen {
            path: path.to_string(),
            message: error.to_string(),
        }
    }

    /// Create a DateParse error
    pub fn date_parse(value: &str) -> Self {
        ImportError::DateParse {
            value: value.to_string(),
        }
    }

    /// Create an AmountParse error
    pub fn amount_parse(value: &str) -> Self {
        ImportError::AmountParse {
            value: value.to_string(),
        }
    }

    /// Create a Store error from a boundary operation name and source error
    pub fn store(operation: &str, message: impl ToString) -> Self {
        ImportError::Store {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a BulkLoad error naming the offending table
    pub fn bulk_load(table: &str, message: impl ToString) -> Self {
        ImportError::BulkLoad {
            table: table.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the run driver may continue after this error
    ///
    /// Only file-open failures are recoverable; everything else aborts the
    /// run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ImportError::FileOpen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::file_open(
        ImportError::FileOpen { path: "Checking-export.qif".to_string(), message: "No such file".to_string() },
        "Error opening file Checking-export.qif. Message: No such file"
    )]
    #[case::date_parse(
        ImportError::DateParse { value: "13-40-99".to_string() },
        "Invalid date payload '13-40-99'"
    )]
    #[case::amount_parse(
        ImportError::AmountParse { value: "12..3".to_string() },
        "Invalid amount '12..3'"
    )]
    #[case::store(
        ImportError::Store { operation: "insert_transaction".to_string(), message: "connection reset".to_string() },
        "Store call 'insert_transaction' failed: connection reset"
    )]
    #[case::bulk_load(
        ImportError::BulkLoad { table: "TransactionSplit".to_string(), message: "constraint".to_string() },
        "Bulk load into table 'TransactionSplit' failed: constraint"
    )]
    fn test_error_display(#[case] error: ImportError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::file_open(ImportError::FileOpen { path: "x".into(), message: "y".into() }, true)]
    #[case::store(ImportError::store("clear_transactions", "boom"), false)]
    #[case::date(ImportError::date_parse("bad"), false)]
    fn test_recoverability(#[case] error: ImportError, #[case] recoverable: bool) {
        assert_eq!(error.is_recoverable(), recoverable);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: ImportError = io_error.into();
        assert!(matches!(error, ImportError::Io { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
