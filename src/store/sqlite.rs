//! SQLite reference backend
//!
//! A concrete [`StoreBackend`] over an embedded SQLite database. It carries
//! the same boundary the original store exposed: three insert procedures
//! returning generated identifiers, run-bracketing maintenance calls, and a
//! staging area plus consolidating step for batch mode.
//!
//! Batch-mode re-linking works through a `StagingID` column on the final
//! parent tables: staged rows are copied over in surrogate-id order, then
//! staged splits are joined through `StagingID` to pick up the final parent
//! identifiers. Amounts are stored as TEXT so decimal values survive the
//! round trip exactly.

use crate::store::StoreBackend;
use crate::types::{
    ImportError, ParentRef, SplitId, SplitRow, TransactionId, TransactionRow, ZeroRecordId,
    ZeroRecordRow,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Account (
    AccountID INTEGER PRIMARY KEY,
    AccountName TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS Setting (
    Name TEXT PRIMARY KEY,
    Value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS AccountTransaction (
    TransactionID INTEGER PRIMARY KEY,
    AccountName TEXT NOT NULL,
    TransactionDate TEXT,
    Description TEXT NOT NULL,
    Amount TEXT NOT NULL,
    Reconciled INTEGER NOT NULL DEFAULT 0,
    Cleared INTEGER NOT NULL DEFAULT 0,
    CheckNumber TEXT NOT NULL DEFAULT '',
    Memo TEXT NOT NULL DEFAULT '',
    StagingID INTEGER
);

CREATE TABLE IF NOT EXISTS ZeroRecord (
    ZeroRecordID INTEGER PRIMARY KEY,
    AccountName TEXT NOT NULL,
    ReferenceDate TEXT,
    StagingID INTEGER
);

CREATE TABLE IF NOT EXISTS TransactionSplit (
    TransactionSplitID INTEGER PRIMARY KEY,
    TransactionID INTEGER,
    ZeroRecordID INTEGER,
    CategoryName TEXT NOT NULL DEFAULT '',
    Amount TEXT NOT NULL,
    ReferenceDate TEXT,
    Description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS StagingTransaction (
    LocalID INTEGER PRIMARY KEY,
    AccountName TEXT NOT NULL,
    TransactionDate TEXT,
    Description TEXT NOT NULL,
    Amount TEXT NOT NULL,
    Reconciled INTEGER NOT NULL,
    Cleared INTEGER NOT NULL,
    CheckNumber TEXT NOT NULL,
    Memo TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS StagingZeroRecord (
    LocalID INTEGER PRIMARY KEY,
    AccountName TEXT NOT NULL,
    ReferenceDate TEXT
);

CREATE TABLE IF NOT EXISTS StagingSplit (
    LocalTransactionID INTEGER,
    LocalZeroRecordID INTEGER,
    CategoryName TEXT NOT NULL,
    Amount TEXT NOT NULL,
    ReferenceDate TEXT,
    Description TEXT NOT NULL
);
";

const CONSOLIDATE: &str = "
INSERT INTO AccountTransaction
    (AccountName, TransactionDate, Description, Amount, Reconciled, Cleared, CheckNumber, Memo, StagingID)
SELECT AccountName, TransactionDate, Description, Amount, Reconciled, Cleared, CheckNumber, Memo, LocalID
FROM StagingTransaction ORDER BY LocalID;

INSERT INTO ZeroRecord (AccountName, ReferenceDate, StagingID)
SELECT AccountName, ReferenceDate, LocalID
FROM StagingZeroRecord ORDER BY LocalID;

INSERT INTO TransactionSplit
    (TransactionID, ZeroRecordID, CategoryName, Amount, ReferenceDate, Description)
SELECT t.TransactionID, z.ZeroRecordID, s.CategoryName, s.Amount, s.ReferenceDate, s.Description
FROM StagingSplit s
LEFT JOIN AccountTransaction t ON t.StagingID = s.LocalTransactionID
LEFT JOIN ZeroRecord z ON z.StagingID = s.LocalZeroRecordID
ORDER BY s.rowid;

DELETE FROM StagingSplit;
DELETE FROM StagingZeroRecord;
DELETE FROM StagingTransaction;
";

/// Embedded-SQLite implementation of the store boundary
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let conn = Connection::open(path).map_err(|e| ImportError::store("open", e))?;
        Self::with_connection(conn)
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self, ImportError> {
        let conn = Connection::open_in_memory().map_err(|e| ImportError::store("open", e))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, ImportError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| ImportError::store("init_schema", e))?;
        Ok(Self { conn })
    }

    /// Register recognized account names, keeping any that already exist
    pub fn seed_accounts(&self, names: &[String]) -> Result<(), ImportError> {
        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO Account (AccountName) VALUES (?1)")
            .map_err(|e| ImportError::store("seed_accounts", e))?;
        for name in names {
            stmt.execute(params![name])
                .map_err(|e| ImportError::store("seed_accounts", e))?;
        }
        Ok(())
    }

    /// All persisted transaction rows, ordered by identifier
    ///
    /// Read-side helper for the end-to-end tests and summary checks.
    pub fn dump_transactions(&self) -> Result<Vec<(TransactionId, TransactionRow)>, ImportError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT TransactionID, AccountName, TransactionDate, Description, Amount, \
                 Reconciled, Cleared, CheckNumber, Memo \
                 FROM AccountTransaction ORDER BY TransactionID",
            )
            .map_err(|e| ImportError::store("dump_transactions", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, bool>(5)?,
                    row.get::<_, bool>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                ))
            })
            .map_err(|e| ImportError::store("dump_transactions", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ImportError::store("dump_transactions", e))?;

        rows.into_iter()
            .map(
                |(id, account, date, description, amount, reconciled, cleared, check, memo)| {
                    Ok((
                        id,
                        TransactionRow {
                            account,
                            date: parse_stored_date(date.as_deref())?,
                            description,
                            amount: parse_stored_amount(&amount)?,
                            reconciled,
                            cleared,
                            check_number: check,
                            memo,
                        },
                    ))
                },
            )
            .collect()
    }

    /// All persisted zero-record rows, ordered by identifier
    pub fn dump_zero_records(&self) -> Result<Vec<(ZeroRecordId, ZeroRecordRow)>, ImportError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT ZeroRecordID, AccountName, ReferenceDate \
                 FROM ZeroRecord ORDER BY ZeroRecordID",
            )
            .map_err(|e| ImportError::store("dump_zero_records", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .map_err(|e| ImportError::store("dump_zero_records", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ImportError::store("dump_zero_records", e))?;

        rows.into_iter()
            .map(|(id, account, date)| {
                Ok((
                    id,
                    ZeroRecordRow {
                        account,
                        reference_date: parse_stored_date(date.as_deref())?,
                    },
                ))
            })
            .collect()
    }

    /// All persisted split rows, ordered by identifier
    pub fn dump_splits(&self) -> Result<Vec<SplitRow>, ImportError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT TransactionID, ZeroRecordID, CategoryName, Amount, ReferenceDate, \
                 Description FROM TransactionSplit ORDER BY TransactionSplitID",
            )
            .map_err(|e| ImportError::store("dump_splits", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(|e| ImportError::store("dump_splits", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ImportError::store("dump_splits", e))?;

        rows.into_iter()
            .map(|(tx_id, zero_id, category, amount, date, description)| {
                let parent = match (tx_id, zero_id) {
                    (Some(id), _) => ParentRef::Transaction(id),
                    (None, Some(id)) => ParentRef::ZeroRecord(id),
                    (None, None) => {
                        return Err(ImportError::store("dump_splits", "split with no parent"))
                    }
                };
                Ok(SplitRow {
                    parent,
                    category,
                    amount: parse_stored_amount(&amount)?,
                    reference_date: parse_stored_date(date.as_deref())?,
                    description,
                })
            })
            .collect()
    }

    /// Value of a maintenance setting, if present
    pub fn setting(&self, name: &str) -> Result<Option<String>, ImportError> {
        self.conn
            .query_row(
                "SELECT Value FROM Setting WHERE Name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(ImportError::store("setting", other)),
            })
    }

    fn upsert_setting(&self, name: &str, value: &str) -> Result<(), ImportError> {
        self.conn
            .execute(
                "INSERT INTO Setting (Name, Value) VALUES (?1, ?2) \
                 ON CONFLICT(Name) DO UPDATE SET Value = excluded.Value",
                params![name, value],
            )
            .map_err(|e| ImportError::store(name, e))?;
        Ok(())
    }
}

fn stored_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn parse_stored_date(value: Option<&str>) -> Result<Option<NaiveDate>, ImportError> {
    value
        .map(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| ImportError::date_parse(v)))
        .transpose()
}

fn parse_stored_amount(value: &str) -> Result<Decimal, ImportError> {
    Decimal::from_str(value).map_err(|_| ImportError::amount_parse(value))
}

fn split_parent_columns(parent: ParentRef) -> (Option<i64>, Option<i64>) {
    match parent {
        ParentRef::Transaction(id) => (Some(id), None),
        ParentRef::ZeroRecord(id) => (None, Some(id)),
    }
}

impl StoreBackend for SqliteBackend {
    async fn account_names(&self) -> Result<Vec<String>, ImportError> {
        let mut stmt = self
            .conn
            .prepare("SELECT AccountName FROM Account ORDER BY AccountID")
            .map_err(|e| ImportError::store("account_names", e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ImportError::store("account_names", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ImportError::store("account_names", e))?;
        Ok(names)
    }

    async fn clear_transactions(&self) -> Result<(), ImportError> {
        self.conn
            .execute_batch(
                "DELETE FROM TransactionSplit; \
                 DELETE FROM ZeroRecord; \
                 DELETE FROM AccountTransaction; \
                 DELETE FROM StagingSplit; \
                 DELETE FROM StagingZeroRecord; \
                 DELETE FROM StagingTransaction;",
            )
            .map_err(|e| ImportError::store("clear_transactions", e))
    }

    async fn extend_switchover_date(&self) -> Result<(), ImportError> {
        // still importing, so the legacy switchover window keeps moving
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
        self.upsert_setting("SwitchoverDate", &today.to_string())
    }

    async fn extend_categories(&self) -> Result<(), ImportError> {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
        self.upsert_setting("CategoriesValidThrough", &today.to_string())
    }

    async fn insert_transaction(
        &self,
        row: &TransactionRow,
    ) -> Result<TransactionId, ImportError> {
        self.conn
            .execute(
                "INSERT INTO AccountTransaction \
                 (AccountName, TransactionDate, Description, Amount, Reconciled, Cleared, \
                  CheckNumber, Memo) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.account,
                    stored_date(row.date),
                    row.description,
                    row.amount.to_string(),
                    row.reconciled,
                    row.cleared,
                    row.check_number,
                    row.memo,
                ],
            )
            .map_err(|e| ImportError::store("insert_transaction", e))?;
        Ok(self.conn.last_insert_rowid())
    }

    async fn insert_zero_record(&self, row: &ZeroRecordRow) -> Result<ZeroRecordId, ImportError> {
        self.conn
            .execute(
                "INSERT INTO ZeroRecord (AccountName, ReferenceDate) VALUES (?1, ?2)",
                params![row.account, stored_date(row.reference_date)],
            )
            .map_err(|e| ImportError::store("insert_zero_record", e))?;
        Ok(self.conn.last_insert_rowid())
    }

    async fn insert_split(&self, row: &SplitRow) -> Result<SplitId, ImportError> {
        let (transaction_id, zero_record_id) = split_parent_columns(row.parent);
        self.conn
            .execute(
                "INSERT INTO TransactionSplit \
                 (TransactionID, ZeroRecordID, CategoryName, Amount, ReferenceDate, Description) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    transaction_id,
                    zero_record_id,
                    row.category,
                    row.amount.to_string(),
                    stored_date(row.reference_date),
                    row.description,
                ],
            )
            .map_err(|e| ImportError::store("insert_split", e))?;
        Ok(self.conn.last_insert_rowid())
    }

    async fn bulk_load_transactions(
        &self,
        rows: &[(TransactionId, TransactionRow)],
    ) -> Result<(), ImportError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| ImportError::bulk_load("AccountTransaction", e))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO StagingTransaction \
                     (LocalID, AccountName, TransactionDate, Description, Amount, Reconciled, \
                      Cleared, CheckNumber, Memo) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )
                .map_err(|e| ImportError::bulk_load("AccountTransaction", e))?;
            for (local_id, row) in rows {
                stmt.execute(params![
                    local_id,
                    row.account,
                    stored_date(row.date),
                    row.description,
                    row.amount.to_string(),
                    row.reconciled,
                    row.cleared,
                    row.check_number,
                    row.memo,
                ])
                .map_err(|e| ImportError::bulk_load("AccountTransaction", e))?;
            }
        }
        tx.commit()
            .map_err(|e| ImportError::bulk_load("AccountTransaction", e))
    }

    async fn bulk_load_zero_records(
        &self,
        rows: &[(ZeroRecordId, ZeroRecordRow)],
    ) -> Result<(), ImportError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| ImportError::bulk_load("ZeroRecord", e))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO StagingZeroRecord (LocalID, AccountName, ReferenceDate) \
                     VALUES (?1, ?2, ?3)",
                )
                .map_err(|e| ImportError::bulk_load("ZeroRecord", e))?;
            for (local_id, row) in rows {
                stmt.execute(params![
                    local_id,
                    row.account,
                    stored_date(row.reference_date)
                ])
                .map_err(|e| ImportError::bulk_load("ZeroRecord", e))?;
            }
        }
        tx.commit().map_err(|e| ImportError::bulk_load("ZeroRecord", e))
    }

    async fn bulk_load_splits(&self, rows: &[SplitRow]) -> Result<(), ImportError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| ImportError::bulk_load("TransactionSplit", e))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO StagingSplit \
                     (LocalTransactionID, LocalZeroRecordID, CategoryName, Amount, \
                      ReferenceDate, Description) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(|e| ImportError::bulk_load("TransactionSplit", e))?;
            for row in rows {
                let (transaction_id, zero_record_id) = split_parent_columns(row.parent);
                stmt.execute(params![
                    transaction_id,
                    zero_record_id,
                    row.category,
                    row.amount.to_string(),
                    stored_date(row.reference_date),
                    row.description,
                ])
                .map_err(|e| ImportError::bulk_load("TransactionSplit", e))?;
            }
        }
        tx.commit()
            .map_err(|e| ImportError::bulk_load("TransactionSplit", e))
    }

    async fn consolidate(&self) -> Result<(), ImportError> {
        self.conn
            .execute_batch(CONSOLIDATE)
            .map_err(|e| ImportError::Consolidate {
                message: e.to_string(),
            })
    }
}
