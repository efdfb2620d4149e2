//! Layout of the seating store: one keyed JSON payload per record.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Layout written by this build.
pub const STORE_LAYOUT_VERSION: u32 = 1;

pub const RECORDS_TABLE: &str = "seating_records";

const CREATE_RECORDS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS seating_records (
    record_key TEXT PRIMARY KEY NOT NULL,
    payload TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Creates the records table on a fresh file and checks it on a known one.
///
/// # Errors
/// - `NewerStoreLayout` when `user_version` is ahead of this build.
/// - `RecordsTableMissing` when a stamped file lost its table.
pub fn prepare_store(conn: &Connection) -> DbResult<()> {
    match store_layout_version(conn)? {
        0 => {
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(CREATE_RECORDS_TABLE)?;
            tx.execute_batch(&format!("PRAGMA user_version = {STORE_LAYOUT_VERSION};"))?;
            tx.commit()?;
            Ok(())
        }
        STORE_LAYOUT_VERSION => {
            if records_table_exists(conn)? {
                Ok(())
            } else {
                Err(DbError::RecordsTableMissing)
            }
        }
        found => Err(DbError::NewerStoreLayout { found }),
    }
}

pub fn store_layout_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

pub fn records_table_exists(conn: &Connection) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [RECORDS_TABLE],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
