//! JSON file import/export.
//!
//! # Invariants
//! - Exports never carry display preferences; importing a file keeps the
//!   preferences already in effect.
//! - A file that fails to parse or validate is rejected as a whole.

use crate::model::state::{AppState, DisplayPrefs};
use crate::repo::snapshot::{decode_export_document, encode_file_export};
use crate::repo::state_repo::{RepoError, RepoResult, StateRepository, StateSnapshot};
use chrono::{NaiveDate, Utc};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Suggested export name, e.g. `座位配置_2024-03-01.json`.
pub fn default_export_file_name(date: NaiveDate) -> String {
    format!("座位配置_{}.json", date.format("%Y-%m-%d"))
}

/// One export document on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store named after today's date inside `dir`.
    pub fn dated_in(dir: impl AsRef<Path>) -> Self {
        let name = default_export_file_name(Utc::now().date_naive());
        Self::new(dir.as_ref().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateRepository for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    fn load(&self) -> RepoResult<Option<StateSnapshot>> {
        let text = fs::read_to_string(&self.path).map_err(|err| {
            RepoError::Io(format!("failed to read {}: {err}", self.path.display()))
        })?;
        match decode_export_document(&text) {
            Ok(snapshot) => {
                info!(
                    "event=file_import module=repo status=ok students={} seats={}",
                    snapshot.state.students.len(),
                    snapshot.state.seat_map.len()
                );
                // File exports never restore preferences.
                Ok(Some(StateSnapshot {
                    prefs: None,
                    ..snapshot
                }))
            }
            Err(err) => {
                error!(
                    "event=file_import module=repo status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save(&self, state: &AppState, _prefs: &DisplayPrefs) -> RepoResult<()> {
        let text = encode_file_export(state)?;
        fs::write(&self.path, &text).map_err(|err| {
            RepoError::Io(format!("failed to write {}: {err}", self.path.display()))
        })?;
        info!(
            "event=file_export module=repo status=ok bytes={}",
            text.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::default_export_file_name;
    use chrono::NaiveDate;

    #[test]
    fn export_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert_eq!(default_export_file_name(date), "座位配置_2024-09-02.json");
    }
}
