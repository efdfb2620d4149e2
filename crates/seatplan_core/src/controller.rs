//! Single owner of the live seating state.
//!
//! # Responsibility
//! - Load state from a `StateRepository` at startup, seeding defaults when
//!   nothing usable is stored.
//! - Route every user intent through `SeatingService::dispatch`.
//! - Persist after each mutating command.
//!
//! # Invariants
//! - Exactly one `SeatingService` per controller; callers read it by
//!   reference and never hold their own copy.
//! - A rejected command leaves both memory and storage untouched.
//! - A failed save keeps the in-memory change; the next save persists it.

use crate::model::state::{AppState, DisplayPrefs};
use crate::repo::state_repo::{RepoError, StateRepository, StateSnapshot};
use crate::service::command::{CommandOutcome, SeatingCommand};
use crate::service::resize::ResizePreview;
use crate::service::seating_service::{SeatingError, SeatingService};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug)]
pub enum ControllerError {
    Seating(SeatingError),
    Repo(RepoError),
}

impl ControllerError {
    /// Stable code for UI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Seating(err) => err.kind().as_str(),
            Self::Repo(err) => err.code(),
        }
    }
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seating(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Seating(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SeatingError> for ControllerError {
    fn from(value: SeatingError) -> Self {
        Self::Seating(value)
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Where the startup state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    /// Nothing stored yet; the default roster was seeded.
    SeededFresh,
    /// The stored record was unreadable; defaults replaced it.
    SeededAfterCorruption,
}

/// Seating engine bound to its primary store.
pub struct SeatingController<R: StateRepository> {
    service: SeatingService,
    repo: R,
    rng: StdRng,
}

impl<R: StateRepository> SeatingController<R> {
    /// Loads from `repo` with an entropy-seeded shuffler.
    ///
    /// # Errors
    /// - Storage or transport failures from `repo`. Malformed stored data is
    ///   not an error; it is replaced by the default roster.
    pub fn open(repo: R) -> ControllerResult<(Self, LoadSource)> {
        Self::open_with_rng(repo, StdRng::from_entropy())
    }

    /// Like [`Self::open`] with a reproducible shuffle sequence.
    pub fn with_seed(repo: R, seed: u64) -> ControllerResult<(Self, LoadSource)> {
        Self::open_with_rng(repo, StdRng::seed_from_u64(seed))
    }

    fn open_with_rng(repo: R, rng: StdRng) -> ControllerResult<(Self, LoadSource)> {
        let (service, source) = match repo.load() {
            Ok(Some(snapshot)) => (
                SeatingService::new(snapshot.state, snapshot.prefs.unwrap_or_default()),
                LoadSource::Stored,
            ),
            Ok(None) => (
                SeatingService::new(AppState::seeded(), DisplayPrefs::default()),
                LoadSource::SeededFresh,
            ),
            Err(RepoError::Malformed(message)) => {
                warn!(
                    "event=controller_open module=controller status=warn backend={} reason=malformed detail={}",
                    repo.backend(),
                    message
                );
                let mut service = SeatingService::default();
                service.load_default_students(true);
                (service, LoadSource::SeededAfterCorruption)
            }
            Err(err) => return Err(err.into()),
        };

        let controller = Self { service, repo, rng };
        if source != LoadSource::Stored {
            controller.save()?;
        }
        info!(
            "event=controller_open module=controller status=ok backend={} source={:?} students={}",
            controller.repo.backend(),
            source,
            controller.service.state().students.len()
        );
        Ok((controller, source))
    }

    pub fn service(&self) -> &SeatingService {
        &self.service
    }

    pub fn state(&self) -> &AppState {
        self.service.state()
    }

    pub fn prefs(&self) -> &DisplayPrefs {
        self.service.prefs()
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Applies one command and persists it when it changed anything.
    pub fn dispatch(&mut self, command: SeatingCommand) -> ControllerResult<CommandOutcome> {
        let outcome = match self.service.dispatch(command, &mut self.rng) {
            Ok(outcome) => outcome,
            Err(err) => {
                info!(
                    "event=command module=controller status=rejected kind={}",
                    err.kind().as_str()
                );
                return Err(err.into());
            }
        };
        if outcome.mutated() {
            self.save()?;
        }
        Ok(outcome)
    }

    pub fn preview_resize(&self, rows: u32, cols: u32) -> ControllerResult<ResizePreview> {
        Ok(self.service.preview_resize(rows, cols)?)
    }

    /// Writes the current state to the primary store.
    pub fn save(&self) -> ControllerResult<()> {
        self.repo
            .save(self.service.state(), self.service.prefs())
            .map_err(ControllerError::from)
    }

    /// Replaces the live state with what `source` holds.
    ///
    /// Returns `false` when `source` has no data; nothing changes then.
    /// Preferences are replaced only when `source` carried them.
    pub fn import_from<S: StateRepository>(&mut self, source: &S) -> ControllerResult<bool> {
        let Some(snapshot) = source.load()? else {
            info!(
                "event=import module=controller status=ok backend={} found=false",
                source.backend()
            );
            return Ok(false);
        };
        self.apply_snapshot(snapshot)?;
        info!(
            "event=import module=controller status=ok backend={} students={}",
            source.backend(),
            self.service.state().students.len()
        );
        Ok(true)
    }

    /// Replaces the live state with an already-validated snapshot and saves.
    pub fn apply_snapshot(&mut self, snapshot: StateSnapshot) -> ControllerResult<()> {
        self.service.replace_state(snapshot.state);
        if let Some(prefs) = snapshot.prefs {
            self.service.set_prefs(prefs);
        }
        self.save()
    }

    /// Writes the live state to a secondary store such as a file or remote.
    pub fn export_to<S: StateRepository>(&self, target: &S) -> ControllerResult<()> {
        target.save(self.service.state(), self.service.prefs())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadSource, SeatingController};
    use crate::db::open_db_in_memory;
    use crate::model::state::DEFAULT_STUDENT_NAMES;
    use crate::repo::local_store::SqliteLocalStore;
    use crate::repo::state_repo::StateRepository;
    use crate::service::command::SeatingCommand;

    #[test]
    fn fresh_store_is_seeded_and_saved() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteLocalStore::try_new(&conn).unwrap();
        let (controller, source) = SeatingController::with_seed(store, 1).unwrap();
        assert_eq!(source, LoadSource::SeededFresh);
        assert_eq!(
            controller.state().students.len(),
            DEFAULT_STUDENT_NAMES.len()
        );
        assert!(controller.repo().load().unwrap().is_some());
    }

    #[test]
    fn corrupt_record_is_replaced_by_defaults() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteLocalStore::try_new(&conn).unwrap();
        store.save_raw("{not json").unwrap();

        let (controller, source) = SeatingController::with_seed(store, 1).unwrap();
        assert_eq!(source, LoadSource::SeededAfterCorruption);
        assert!(controller.state().seat_map.is_empty());
        assert!(controller.repo().load_raw().unwrap().unwrap().starts_with('{'));
    }

    #[test]
    fn rejected_command_is_not_persisted() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteLocalStore::try_new(&conn).unwrap();
        let (mut controller, _) = SeatingController::with_seed(store, 1).unwrap();
        let before = controller.repo().load_raw().unwrap();

        let err = controller
            .dispatch(SeatingCommand::AddStudent {
                name: "   ".to_string(),
                note: String::new(),
            })
            .unwrap_err();
        assert_eq!(err.code(), "validation");
        assert_eq!(controller.repo().load_raw().unwrap(), before);
    }
}
