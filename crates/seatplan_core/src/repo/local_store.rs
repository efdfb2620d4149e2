//! SQLite-backed local durable store.
//!
//! # Responsibility
//! - Persist the local record JSON under a string key, like a browser
//!   key/value store.
//!
//! # Invariants
//! - One row per key; `save` replaces the whole payload.
//! - A missing row means "nothing saved yet", not an error.

use crate::db::schema::{records_table_exists, RECORDS_TABLE};
use crate::model::state::{AppState, DisplayPrefs};
use crate::repo::snapshot::{decode_local_record, encode_local_record};
use crate::repo::state_repo::{RepoError, RepoResult, StateRepository, StateSnapshot};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};

/// Key under which the seating record is stored.
pub const LOCAL_STORAGE_KEY: &str = "seatingChartData";

/// Local store over a connection from `db::open_db`.
pub struct SqliteLocalStore<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteLocalStore<'conn> {
    /// Uses the default `seatingChartData` key.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_key(conn, LOCAL_STORAGE_KEY)
    }

    /// Uses a caller-chosen key, e.g. one record per class.
    pub fn with_key(conn: &'conn Connection, key: impl Into<String>) -> RepoResult<Self> {
        ensure_records_table(conn)?;
        Ok(Self {
            conn,
            key: key.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored payload, if any.
    pub fn load_raw(&self) -> RepoResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM seating_records WHERE record_key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    /// Replaces the raw payload.
    pub fn save_raw(&self, payload: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO seating_records (record_key, payload)
             VALUES (?1, ?2)
             ON CONFLICT(record_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.key.as_str(), payload],
        )?;
        Ok(())
    }

    /// Deletes the stored record; returns whether one existed.
    pub fn clear(&self) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM seating_records WHERE record_key = ?1;",
            [self.key.as_str()],
        )?;
        Ok(changed > 0)
    }
}

impl StateRepository for SqliteLocalStore<'_> {
    fn backend(&self) -> &'static str {
        "local"
    }

    fn load(&self) -> RepoResult<Option<StateSnapshot>> {
        let Some(payload) = self.load_raw()? else {
            info!("event=state_load module=repo status=ok backend=local found=false");
            return Ok(None);
        };
        match decode_local_record(&payload) {
            Ok(snapshot) => {
                info!(
                    "event=state_load module=repo status=ok backend=local found=true students={} seats={}",
                    snapshot.state.students.len(),
                    snapshot.state.seat_map.len()
                );
                Ok(Some(snapshot))
            }
            Err(err) => {
                error!(
                    "event=state_load module=repo status=error backend=local error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save(&self, state: &AppState, prefs: &DisplayPrefs) -> RepoResult<()> {
        let payload = encode_local_record(state, prefs)?;
        self.save_raw(&payload)?;
        info!(
            "event=state_save module=repo status=ok backend=local bytes={}",
            payload.len()
        );
        Ok(())
    }
}

fn ensure_records_table(conn: &Connection) -> RepoResult<()> {
    if records_table_exists(conn)? {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(RECORDS_TABLE))
    }
}
