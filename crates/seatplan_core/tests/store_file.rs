use rusqlite::Connection;
use seatplan_core::db::schema::store_layout_version;
use seatplan_core::db::{open_db, open_db_in_memory, DbError, STORE_LAYOUT_VERSION};
use seatplan_core::{AppState, DisplayPrefs, RepoError, SqliteLocalStore, StateRepository};

#[test]
fn fresh_store_is_stamped_and_usable() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(store_layout_version(&conn).unwrap(), STORE_LAYOUT_VERSION);

    let store = SqliteLocalStore::try_new(&conn).unwrap();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn saved_roster_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seatplan.db");
    let state = AppState::seeded();

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteLocalStore::try_new(&conn).unwrap();
        store.save(&state, &DisplayPrefs::default()).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteLocalStore::try_new(&conn).unwrap();
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.state.students.len(), state.students.len());
}

#[test]
fn existing_unstamped_file_gains_records_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE notes (body TEXT);").unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert!(SqliteLocalStore::try_new(&conn).is_ok());
    let notes: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(notes, 0);
}

#[test]
fn store_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 7;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::NewerStoreLayout { found: 7 }));
    assert!(err.to_string().contains("newer build"));
}

#[test]
fn stamped_store_without_records_table_is_reported_damaged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("damaged.db");
    drop(open_db(&path).unwrap());

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("DROP TABLE seating_records;").unwrap();
    assert!(matches!(
        SqliteLocalStore::try_new(&conn),
        Err(RepoError::MissingRequiredTable("seating_records"))
    ));
    drop(conn);

    assert!(matches!(
        open_db(&path).unwrap_err(),
        DbError::RecordsTableMissing
    ));
}
