//! SQLite file backing the local seating store.
//!
//! # Responsibility
//! - Open store files (or throwaway in-memory stores) ready for the
//!   `seating_records` table.
//! - Refuse files written by a newer build or with the records table gone.
//!
//! # Invariants
//! - The store layout version lives in `PRAGMA user_version`.
//! - A connection handed out by `open_db*` always has `seating_records`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{RECORDS_TABLE, STORE_LAYOUT_VERSION};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open or prepare a seating store file.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was laid out by a newer seatplan build.
    NewerStoreLayout { found: u32 },
    /// The file claims the current layout but the records table is gone.
    RecordsTableMissing,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "seating store: {err}"),
            Self::NewerStoreLayout { found } => write!(
                f,
                "seating store layout {found} was written by a newer build (this build reads {STORE_LAYOUT_VERSION})"
            ),
            Self::RecordsTableMissing => write!(
                f,
                "seating store is damaged: table `{RECORDS_TABLE}` is missing"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
