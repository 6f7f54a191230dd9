//! Append-only tabular storage.
//!
//! The club's records live in three logical tables. Callers only ever append
//! rows or read a table back in full; nothing is updated or deleted.
//!
//! - `JsonStore`: one JSON file per table in the data directory
//! - `MemoryStore`: in-process tables, used by tests and dry runs

pub mod json;
pub mod memory;

use thiserror::Error;

use crate::models::Row;

pub use json::{JsonStore, TableFile};
pub use memory::MemoryStore;

/// Logical tables in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Attendance,
    Invoices,
    SessionDates,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Attendance, Table::Invoices, Table::SessionDates];

    /// Collection name, also used as the file stem
    pub fn name(&self) -> &'static str {
        match self {
            Table::Attendance => "attendance",
            Table::Invoices => "invoices",
            Table::SessionDates => "session_dates",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot create data directory {path}: {source}")]
    DataDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on table {table}: {source}")]
    Io {
        table: Table,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt table file {table}: {source}")]
    Corrupt {
        table: Table,
        #[source]
        source: serde_json::Error,
    },
}

/// Narrow repository interface over the record tables.
pub trait TableStore {
    fn append_rows(&self, table: Table, rows: &[Row]) -> Result<(), StoreError>;

    /// All rows in append order. A table that was never written is empty.
    fn read_all_rows(&self, table: Table) -> Result<Vec<Row>, StoreError>;
}

impl<S: TableStore + ?Sized> TableStore for &S {
    fn append_rows(&self, table: Table, rows: &[Row]) -> Result<(), StoreError> {
        (**self).append_rows(table, rows)
    }

    fn read_all_rows(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        (**self).read_all_rows(table)
    }
}
