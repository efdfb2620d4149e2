//! JSON wire shapes for persisted and exported seating state.
//!
//! # Responsibility
//! - Encode/decode the local record (`seatingChartData`) shape.
//! - Encode/decode the export document used by files and the remote store.
//! - Validate decoded data into a sanitized `StateSnapshot`.
//!
//! # Invariants
//! - The local record tolerates missing or `null` fields and fills defaults.
//! - Remote documents are read with the same leniency as the local record.
//! - A file import requires `students`, `seatingConfig` and `seatingMap`;
//!   anything else is optional.
//! - Duplicate student ids or an out-of-range grid reject the whole payload.

use crate::model::constraint::ConstraintSet;
use crate::model::seat::GridConfig;
use crate::model::state::{AppState, DisplayPrefs, SeatMap};
use crate::model::student::Student;
use crate::model::null_as_default;
use crate::repo::state_repo::{RepoError, RepoResult, StateSnapshot};
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// Shape stored under the local durable key.
///
/// Also the lenient reader for remote documents: absent or `null` fields
/// fall back to defaults and unknown keys such as `savedAt` are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub students: Vec<Student>,
    #[serde(default)]
    pub seating_config: Option<GridConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seating_map: SeatMap,
    #[serde(default)]
    pub print_font_size: Option<u32>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub constraints: ConstraintSet,
}

impl LocalRecord {
    pub fn from_state(state: &AppState, prefs: &DisplayPrefs) -> Self {
        Self {
            students: state.students.clone(),
            seating_config: Some(state.grid),
            seating_map: state.seat_map.clone(),
            print_font_size: Some(prefs.print_font_size),
            class_name: Some(prefs.class_name.clone()),
            constraints: state.constraints.clone(),
        }
    }

    /// Validates into a snapshot; missing preferences fall back to defaults.
    pub fn into_snapshot(self) -> RepoResult<StateSnapshot> {
        let prefs = prefs_with_defaults(self.print_font_size, self.class_name);
        let state = finish_state(AppState {
            students: self.students,
            grid: self.seating_config.unwrap_or_default(),
            seat_map: self.seating_map,
            constraints: self.constraints,
        })?;
        Ok(StateSnapshot {
            state,
            prefs: Some(prefs),
        })
    }
}

/// File export / remote document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub students: Vec<Student>,
    pub seating_config: GridConfig,
    pub seating_map: SeatMap,
    #[serde(default)]
    pub constraints: ConstraintSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl ExportDocument {
    /// Builds a document; `prefs` is included only for the remote store.
    pub fn from_state(
        state: &AppState,
        prefs: Option<&DisplayPrefs>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            students: state.students.clone(),
            seating_config: state.grid,
            seating_map: state.seat_map.clone(),
            constraints: state.constraints.clone(),
            print_font_size: prefs.map(|prefs| prefs.print_font_size),
            class_name: prefs.map(|prefs| prefs.class_name.clone()),
            saved_at: Some(format_saved_at(saved_at)),
        }
    }

    /// Validates into a snapshot; prefs are present only if the document had any.
    pub fn into_snapshot(self) -> RepoResult<StateSnapshot> {
        let prefs = if self.print_font_size.is_some() || self.class_name.is_some() {
            Some(prefs_with_defaults(self.print_font_size, self.class_name))
        } else {
            None
        };
        let state = finish_state(AppState {
            students: self.students,
            grid: self.seating_config,
            seat_map: self.seating_map,
            constraints: self.constraints,
        })?;
        Ok(StateSnapshot { state, prefs })
    }
}

/// ISO-8601 UTC timestamp with millisecond precision and `Z` suffix.
pub fn format_saved_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn encode_local_record(state: &AppState, prefs: &DisplayPrefs) -> RepoResult<String> {
    serde_json::to_string(&LocalRecord::from_state(state, prefs))
        .map_err(|err| RepoError::Malformed(format!("failed to encode local record: {err}")))
}

pub fn decode_local_record(text: &str) -> RepoResult<StateSnapshot> {
    let record: LocalRecord = serde_json::from_str(text)
        .map_err(|err| RepoError::Malformed(format!("local record: {err}")))?;
    record.into_snapshot()
}

/// Reads a remote document leniently; preferences always come back filled.
pub fn decode_remote_document(value: serde_json::Value) -> RepoResult<StateSnapshot> {
    let record: LocalRecord = serde_json::from_value(value)
        .map_err(|err| RepoError::Malformed(format!("remote document: {err}")))?;
    record.into_snapshot()
}

/// Pretty-printed export document.
pub fn encode_export_document(
    state: &AppState,
    prefs: Option<&DisplayPrefs>,
    saved_at: DateTime<Utc>,
) -> RepoResult<String> {
    serde_json::to_string_pretty(&ExportDocument::from_state(state, prefs, saved_at))
        .map_err(|err| RepoError::Malformed(format!("failed to encode export document: {err}")))
}

/// File export: the export document stamped now, without preferences.
pub fn encode_file_export(state: &AppState) -> RepoResult<String> {
    encode_export_document(state, None, Utc::now())
}

pub fn decode_export_document(text: &str) -> RepoResult<StateSnapshot> {
    let document: ExportDocument = serde_json::from_str(text)
        .map_err(|err| RepoError::Malformed(format!("export document: {err}")))?;
    document.into_snapshot()
}

fn prefs_with_defaults(font_size: Option<u32>, class_name: Option<String>) -> DisplayPrefs {
    let defaults = DisplayPrefs::default();
    DisplayPrefs {
        print_font_size: font_size
            .map(DisplayPrefs::clamp_font_size)
            .unwrap_or(defaults.print_font_size),
        class_name: class_name
            .map(|name| DisplayPrefs::normalize_class_name(&name))
            .unwrap_or(defaults.class_name),
    }
}

fn finish_state(mut state: AppState) -> RepoResult<AppState> {
    if state.has_duplicate_student_ids() {
        return Err(RepoError::Malformed(
            "roster contains duplicate student ids".to_string(),
        ));
    }
    let report = state
        .sanitize()
        .map_err(|err| RepoError::Malformed(err.to_string()))?;
    if !report.is_clean() {
        warn!(
            "event=state_sanitize module=repo status=warn dropped_seats={} dropped_constraints={}",
            report.dropped_seats, report.dropped_constraints
        );
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::{decode_export_document, decode_local_record, format_saved_at};
    use crate::model::seat::SeatKey;
    use crate::repo::state_repo::RepoError;
    use chrono::{TimeZone, Utc};

    #[test]
    fn saved_at_matches_iso_millis_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        assert_eq!(format_saved_at(at), "2024-03-01T08:30:00.000Z");
    }

    #[test]
    fn local_record_fills_missing_fields() {
        let snapshot = decode_local_record(r#"{"students":[{"id":"1","name":"A"}]}"#).unwrap();
        assert_eq!(snapshot.state.students.len(), 1);
        assert_eq!(snapshot.state.grid.rows, 4);
        assert_eq!(snapshot.prefs.unwrap().print_font_size, 16);
    }

    #[test]
    fn local_record_reads_null_fields_as_defaults() {
        let text = r#"{
            "students":[{"id":"1","name":"A","note":null}],
            "seatingConfig":null,
            "seatingMap":null,
            "constraints":null,
            "printFontSize":null,
            "className":null
        }"#;
        let snapshot = decode_local_record(text).unwrap();
        assert_eq!(snapshot.state.students[0].note, "");
        assert_eq!(snapshot.state.grid.cols, 6);
        assert!(snapshot.state.seat_map.is_empty());
        assert!(snapshot.state.constraints.is_empty());
        assert_eq!(snapshot.prefs.unwrap().class_name, "課後班");
    }

    #[test]
    fn export_document_requires_core_keys() {
        let err = decode_export_document(r#"{"students":[],"seatingConfig":{"rows":2,"cols":2}}"#)
            .unwrap_err();
        assert!(matches!(err, RepoError::Malformed(_)));
    }

    #[test]
    fn export_document_rejects_bad_seat_key() {
        let text = r#"{"students":[],"seatingConfig":{"rows":2,"cols":2},"seatingMap":{"x":"1"}}"#;
        assert!(matches!(
            decode_export_document(text),
            Err(RepoError::Malformed(_))
        ));
    }

    #[test]
    fn export_document_drops_dangling_entries() {
        let text = r#"{
            "students":[{"id":"1","name":"A","note":""}],
            "seatingConfig":{"rows":2,"cols":2},
            "seatingMap":{"1-1":"1","2-2":"gone"},
            "constraints":[{"a":"1","b":"gone"}]
        }"#;
        let snapshot = decode_export_document(text).unwrap();
        assert!(snapshot.prefs.is_none());
        assert_eq!(snapshot.state.seat_map.len(), 1);
        assert_eq!(snapshot.state.seat_of("1"), Some(SeatKey::new(1, 1)));
        assert!(snapshot.state.constraints.is_empty());
    }
}
