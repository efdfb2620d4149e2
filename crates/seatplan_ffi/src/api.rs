//! FFI use-case API for the seating chart UI.
//!
//! # Responsibility
//! - Expose seating intents to Dart via FRB as sync calls.
//! - Flatten engine results and errors into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call runs against the same local store; the UI re-reads
//!   `seating_snapshot` after any successful mutation.
//! - Error envelopes carry a stable `code` (`validation`,
//!   `constraint_violation`, `not_found`, `storage_error`, `io_error`,
//!   `malformed_data`, `transport_error`, `not_configured`).

use log::warn;
use seatplan_core::db::open_db;
use seatplan_core::repo::snapshot::{decode_export_document, encode_file_export};
use seatplan_core::{
    core_version as core_version_inner, default_export_file_name,
    init_logging as init_logging_inner, CommandOutcome, ControllerError, ControllerResult,
    RemoteStore, RemoteStoreConfig, SeatKey, SeatingCommand, SeatingController, SqliteLocalStore,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const SEATPLAN_DB_FILE_NAME: &str = "seatplan.sqlite3";
static SEATPLAN_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Idempotent for the same pair; returns empty string on success and an
///   error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentItem {
    pub id: String,
    pub name: String,
    pub note: String,
    /// `r-c` seat key, `None` when unseated.
    pub seat: Option<String>,
}

/// One occupied seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatItem {
    pub row: u32,
    pub col: u32,
    pub student_id: String,
}

/// One forbidden pair, in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintItem {
    pub index: u32,
    pub a: String,
    pub b: String,
}

/// Full read model for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatingSnapshotResponse {
    pub ok: bool,
    pub message: String,
    pub rows: u32,
    pub cols: u32,
    pub class_name: String,
    pub print_font_size: u32,
    pub students: Vec<StudentItem>,
    pub seats: Vec<SeatItem>,
    pub constraints: Vec<ConstraintItem>,
}

/// Result envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatingActionResponse {
    pub ok: bool,
    /// Stable error code on failure.
    pub code: Option<String>,
    /// True when a failure should be shown as info (e.g. duplicate pair).
    pub informational: bool,
    /// Id of the student created or edited, if any.
    pub student_id: Option<String>,
    pub message: String,
}

impl SeatingActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            code: None,
            informational: false,
            student_id: None,
            message: message.into(),
        }
    }

    fn with_student(mut self, student_id: String) -> Self {
        self.student_id = Some(student_id);
        self
    }

    fn failure(err: &ControllerError) -> Self {
        let informational = matches!(err, ControllerError::Seating(inner) if inner.is_informational());
        Self {
            ok: false,
            code: Some(err.code().to_string()),
            informational,
            student_id: None,
            message: err.to_string(),
        }
    }
}

/// Dry-run result for a grid resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizePreviewResponse {
    pub ok: bool,
    pub message: String,
    pub needs_confirmation: bool,
    /// `r-c` keys of occupied seats the resize would drop.
    pub dropped_seats: Vec<String>,
}

/// Export payload for the file save dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    pub message: String,
    pub file_name: String,
    pub json: Option<String>,
}

/// Reads the current state for rendering.
#[flutter_rust_bridge::frb(sync)]
pub fn seating_snapshot() -> SeatingSnapshotResponse {
    match with_controller(|controller| Ok(to_snapshot_response(controller))) {
        Ok(response) => response,
        Err(err) => SeatingSnapshotResponse {
            ok: false,
            message: format!("seating_snapshot failed: {err}"),
            rows: 0,
            cols: 0,
            class_name: String::new(),
            print_font_size: 0,
            students: Vec::new(),
            seats: Vec::new(),
            constraints: Vec::new(),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn student_add(name: String, note: String) -> SeatingActionResponse {
    run_command(SeatingCommand::AddStudent { name, note })
}

#[flutter_rust_bridge::frb(sync)]
pub fn student_edit(student_id: String, name: String, note: String) -> SeatingActionResponse {
    run_command(SeatingCommand::EditStudent {
        student_id,
        name,
        note,
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn student_remove(student_id: String) -> SeatingActionResponse {
    run_command(SeatingCommand::RemoveStudent { student_id })
}

/// Bulk roster import from free text (`name` or `name|note` entries).
#[flutter_rust_bridge::frb(sync)]
pub fn students_bulk_add(raw: String) -> SeatingActionResponse {
    run_command(SeatingCommand::AddStudents { raw })
}

#[flutter_rust_bridge::frb(sync)]
pub fn students_load_defaults(clear_seating: bool) -> SeatingActionResponse {
    run_command(SeatingCommand::LoadDefaultStudents { clear_seating })
}

/// Seat click or drop: swaps with a different occupant, otherwise places.
#[flutter_rust_bridge::frb(sync)]
pub fn seat_assign(student_id: String, row: u32, col: u32) -> SeatingActionResponse {
    run_command(SeatingCommand::Assign {
        student_id,
        seat: SeatKey::new(row, col),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn seat_clear(row: u32, col: u32) -> SeatingActionResponse {
    run_command(SeatingCommand::ClearSeat {
        seat: SeatKey::new(row, col),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn seats_clear_all() -> SeatingActionResponse {
    run_command(SeatingCommand::ClearSeats)
}

#[flutter_rust_bridge::frb(sync)]
pub fn seats_auto_arrange() -> SeatingActionResponse {
    run_command(SeatingCommand::AutoArrange)
}

#[flutter_rust_bridge::frb(sync)]
pub fn grid_preview_resize(rows: u32, cols: u32) -> ResizePreviewResponse {
    match with_controller(|controller| controller.preview_resize(rows, cols)) {
        Ok(preview) => ResizePreviewResponse {
            ok: true,
            message: format!(
                "Resize to {rows}x{cols} drops {} seat(s).",
                preview.dropped_seats.len()
            ),
            needs_confirmation: preview.needs_confirmation,
            dropped_seats: preview
                .dropped_seats
                .iter()
                .map(ToString::to_string)
                .collect(),
        },
        Err(err) => ResizePreviewResponse {
            ok: false,
            message: format!("grid_preview_resize failed: {err}"),
            needs_confirmation: false,
            dropped_seats: Vec::new(),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn grid_resize(rows: u32, cols: u32) -> SeatingActionResponse {
    run_command(SeatingCommand::Resize { rows, cols })
}

#[flutter_rust_bridge::frb(sync)]
pub fn constraint_add(a: String, b: String) -> SeatingActionResponse {
    run_command(SeatingCommand::AddConstraint { a, b })
}

#[flutter_rust_bridge::frb(sync)]
pub fn constraint_remove_at(index: u32) -> SeatingActionResponse {
    run_command(SeatingCommand::RemoveConstraintAt {
        index: index as usize,
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn prefs_set_print_font_size(size: u32) -> SeatingActionResponse {
    run_command(SeatingCommand::SetPrintFontSize { size })
}

#[flutter_rust_bridge::frb(sync)]
pub fn prefs_set_class_name(name: String) -> SeatingActionResponse {
    run_command(SeatingCommand::SetClassName { name })
}

/// Serializes the current state as a file export document.
#[flutter_rust_bridge::frb(sync)]
pub fn export_json() -> ExportResponse {
    let file_name = default_export_file_name(chrono_today());
    match with_controller(|controller| Ok(encode_file_export(controller.state())?)) {
        Ok(json) => ExportResponse {
            ok: true,
            message: "Export ready.".to_string(),
            file_name,
            json: Some(json),
        },
        Err(err) => ExportResponse {
            ok: false,
            message: format!("export_json failed: {err}"),
            file_name,
            json: None,
        },
    }
}

/// Replaces the current state with an export document; prefs are kept.
#[flutter_rust_bridge::frb(sync)]
pub fn import_json(json: String) -> SeatingActionResponse {
    let result = with_controller(|controller| {
        let mut snapshot = decode_export_document(&json)?;
        snapshot.prefs = None;
        controller.apply_snapshot(snapshot)?;
        Ok(controller.state().students.len())
    });
    match result {
        Ok(count) => SeatingActionResponse::success(format!("Imported {count} student(s).")),
        Err(err) => SeatingActionResponse::failure(&err),
    }
}

/// Pulls state and prefs from the remote endpoint.
#[flutter_rust_bridge::frb(sync)]
pub fn remote_load(endpoint: String) -> SeatingActionResponse {
    let result = with_controller(|controller| {
        let remote = RemoteStore::new(RemoteStoreConfig::new(endpoint))?;
        controller.import_from(&remote)
    });
    match result {
        Ok(true) => SeatingActionResponse::success("Loaded from remote."),
        Ok(false) => SeatingActionResponse::success("Remote holds no data."),
        Err(err) => SeatingActionResponse::failure(&err),
    }
}

/// Pushes state and prefs to the remote endpoint.
#[flutter_rust_bridge::frb(sync)]
pub fn remote_save(endpoint: String) -> SeatingActionResponse {
    let result = with_controller(|controller| {
        let remote = RemoteStore::new(RemoteStoreConfig::new(endpoint))?;
        controller.export_to(&remote)
    });
    match result {
        Ok(()) => SeatingActionResponse::success("Saved to remote."),
        Err(err) => SeatingActionResponse::failure(&err),
    }
}

fn run_command(command: SeatingCommand) -> SeatingActionResponse {
    match with_controller(|controller| controller.dispatch(command)) {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => {
            if let ControllerError::Repo(_) = err {
                warn!(
                    "event=ffi_command module=ffi status=error error_code={}",
                    err.code()
                );
            }
            SeatingActionResponse::failure(&err)
        }
    }
}

fn outcome_response(outcome: CommandOutcome) -> SeatingActionResponse {
    match outcome {
        CommandOutcome::StudentAdded(student) => {
            SeatingActionResponse::success("Student added.").with_student(student.id)
        }
        CommandOutcome::StudentUpdated(student) => {
            SeatingActionResponse::success("Student updated.").with_student(student.id)
        }
        CommandOutcome::StudentRemoved(Some(student)) => {
            SeatingActionResponse::success("Student removed.").with_student(student.id)
        }
        CommandOutcome::StudentRemoved(None) => SeatingActionResponse::success("No such student."),
        CommandOutcome::StudentsImported(report) => SeatingActionResponse::success(format!(
            "Added {}, skipped {} duplicate(s) and {} invalid name(s).",
            report.added, report.duplicate, report.invalid
        )),
        CommandOutcome::DefaultsLoaded(count) => {
            SeatingActionResponse::success(format!("Loaded {count} default student(s)."))
        }
        CommandOutcome::Placed(seat) => SeatingActionResponse::success(format!("Placed at {seat}.")),
        CommandOutcome::Assigned(_) => SeatingActionResponse::success("Seat updated."),
        CommandOutcome::SeatCleared(_) => SeatingActionResponse::success("Seat cleared."),
        CommandOutcome::Swapped(_) => SeatingActionResponse::success("Students swapped."),
        CommandOutcome::Arranged(report) if report.is_complete() => {
            SeatingActionResponse::success(format!("Seated all {} student(s).", report.placed))
        }
        CommandOutcome::Arranged(report) => SeatingActionResponse::success(format!(
            "Seated {}; {} student(s) could not be placed.",
            report.placed,
            report.unplaced_count()
        )),
        CommandOutcome::SeatsCleared(0) => SeatingActionResponse::success("Nothing to clear."),
        CommandOutcome::SeatsCleared(count) => {
            SeatingActionResponse::success(format!("Cleared {count} seat(s)."))
        }
        CommandOutcome::Resized(report) => SeatingActionResponse::success(format!(
            "Grid is now {}x{}; dropped {} seat(s).",
            report.applied.rows, report.applied.cols, report.dropped
        )),
        CommandOutcome::ConstraintAdded => SeatingActionResponse::success("Constraint added."),
        CommandOutcome::ConstraintRemoved(_) => SeatingActionResponse::success("Constraint removed."),
        CommandOutcome::FontSizeSet(size) => {
            SeatingActionResponse::success(format!("Print font size is {size}."))
        }
        CommandOutcome::ClassNameSet(name) => {
            SeatingActionResponse::success(format!("Class name is {name}."))
        }
    }
}

fn to_snapshot_response(
    controller: &SeatingController<SqliteLocalStore<'_>>,
) -> SeatingSnapshotResponse {
    let state = controller.state();
    let prefs = controller.prefs();
    SeatingSnapshotResponse {
        ok: true,
        message: format!("{} student(s).", state.students.len()),
        rows: state.grid.rows,
        cols: state.grid.cols,
        class_name: prefs.class_name.clone(),
        print_font_size: prefs.print_font_size,
        students: state
            .students
            .iter()
            .map(|student| StudentItem {
                id: student.id.clone(),
                name: student.name.clone(),
                note: student.note.clone(),
                seat: state.seat_of(&student.id).map(|seat| seat.to_string()),
            })
            .collect(),
        seats: state
            .seat_map
            .iter()
            .map(|(seat, student_id)| SeatItem {
                row: seat.row,
                col: seat.col,
                student_id: student_id.clone(),
            })
            .collect(),
        constraints: state
            .constraints
            .iter()
            .enumerate()
            .map(|(index, pair)| ConstraintItem {
                index: index as u32,
                a: pair.a.clone(),
                b: pair.b.clone(),
            })
            .collect(),
    }
}

fn chrono_today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn resolve_db_path() -> PathBuf {
    SEATPLAN_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("SEATPLAN_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(SEATPLAN_DB_FILE_NAME)
        })
        .clone()
}

fn with_controller<T>(
    f: impl FnOnce(&mut SeatingController<SqliteLocalStore<'_>>) -> ControllerResult<T>,
) -> ControllerResult<T> {
    let conn = open_db(resolve_db_path()).map_err(|err| ControllerError::Repo(err.into()))?;
    let store = SqliteLocalStore::try_new(&conn)?;
    let (mut controller, _) = SeatingController::open(store)?;
    f(&mut controller)
}

#[cfg(test)]
mod tests {
    use super::{
        constraint_add, core_version, export_json, import_json, init_logging, seat_assign,
        seating_snapshot, student_add, student_remove, students_bulk_add,
    };
    use seatplan_core::db::open_db;
    use seatplan_core::SqliteLocalStore;
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // All tests share one on-disk store; serialize mutating ones.
    static STORE_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/seatplan-logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn added_student_appears_in_snapshot_and_can_be_removed() {
        let _guard = STORE_LOCK.lock().unwrap();
        let name = unique_name("s");
        let added = student_add(name.clone(), "front".to_string());
        assert!(added.ok, "{}", added.message);
        let id = added.student_id.unwrap();

        let snapshot = seating_snapshot();
        assert!(snapshot.ok, "{}", snapshot.message);
        assert!(snapshot
            .students
            .iter()
            .any(|student| student.id == id && student.name == name));

        assert!(student_remove(id.clone()).ok);
        assert!(seating_snapshot()
            .students
            .iter()
            .all(|student| student.id != id));
    }

    #[test]
    fn mutations_are_written_to_the_local_record() {
        let _guard = STORE_LOCK.lock().unwrap();
        let name = unique_name("p");
        let id = student_add(name, String::new()).student_id.unwrap();

        let conn = open_db(super::resolve_db_path()).unwrap();
        let payload = SqliteLocalStore::try_new(&conn)
            .unwrap()
            .load_raw()
            .unwrap()
            .unwrap();
        assert!(payload.contains(&id));
        student_remove(id);
    }

    #[test]
    fn blank_name_reports_validation_code() {
        let _guard = STORE_LOCK.lock().unwrap();
        let response = student_add("  ".to_string(), String::new());
        assert!(!response.ok);
        assert_eq!(response.code.as_deref(), Some("validation"));
    }

    #[test]
    fn duplicate_constraint_is_informational() {
        let _guard = STORE_LOCK.lock().unwrap();
        let a = student_add(unique_name("a"), String::new()).student_id.unwrap();
        let b = student_add(unique_name("b"), String::new()).student_id.unwrap();

        assert!(constraint_add(a.clone(), b.clone()).ok);
        let again = constraint_add(b.clone(), a.clone());
        assert!(!again.ok);
        assert!(again.informational);

        student_remove(a);
        student_remove(b);
    }

    #[test]
    fn out_of_bounds_assign_is_not_found() {
        let _guard = STORE_LOCK.lock().unwrap();
        let id = student_add(unique_name("o"), String::new()).student_id.unwrap();
        let response = seat_assign(id.clone(), 99, 1);
        assert!(!response.ok);
        assert_eq!(response.code.as_deref(), Some("not_found"));
        student_remove(id);
    }

    #[test]
    fn export_then_import_restores_roster() {
        let _guard = STORE_LOCK.lock().unwrap();
        let exported = export_json();
        assert!(exported.ok, "{}", exported.message);
        assert!(exported.file_name.starts_with("座位配置_"));
        let json = exported.json.unwrap();
        let before = seating_snapshot().students.len();

        assert!(students_bulk_add(unique_name("x")).ok);
        let imported = import_json(json);
        assert!(imported.ok, "{}", imported.message);
        assert_eq!(seating_snapshot().students.len(), before);
    }

    #[test]
    fn malformed_import_is_rejected() {
        let _guard = STORE_LOCK.lock().unwrap();
        let response = import_json("{\"students\": 3}".to_string());
        assert!(!response.ok);
        assert_eq!(response.code.as_deref(), Some("malformed_data"));
    }

    fn unique_name(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        // Names are capped at 20 characters.
        format!("{prefix}{}", nanos % 1_000_000_000_000)
    }
}
