//! Snapshot repository contract and error model.

use crate::db::DbError;
use crate::model::state::{AppState, DisplayPrefs};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error shared by every backend.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    /// Local file read/write failure.
    Io(String),
    /// Stored or imported JSON is corrupt or incomplete.
    Malformed(String),
    /// Remote endpoint unreachable or answered with a non-success HTTP status.
    Transport(String),
    /// Remote endpoint answered but reported a failure status.
    Remote(String),
    /// Backend cannot be used with the given settings.
    NotConfigured(String),
}

impl RepoError {
    /// Stable machine-readable code for UI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(_) | Self::MissingRequiredTable(_) => "storage_error",
            Self::Io(_) => "io_error",
            Self::Malformed(_) => "malformed_data",
            Self::Transport(_) | Self::Remote(_) => "transport_error",
            Self::NotConfigured(_) => "not_configured",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "seating store is missing required table `{table}`")
            }
            Self::Io(message) => write!(f, "file access failed: {message}"),
            Self::Malformed(message) => write!(f, "malformed seating data: {message}"),
            Self::Transport(message) => write!(f, "remote store unreachable: {message}"),
            Self::Remote(message) => write!(f, "remote store rejected request: {message}"),
            Self::NotConfigured(message) => write!(f, "store not configured: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// A loaded state plus the display preferences stored alongside it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub state: AppState,
    pub prefs: Option<DisplayPrefs>,
}

/// Whole-snapshot persistence backend.
pub trait StateRepository {
    /// Short backend label used in logs.
    fn backend(&self) -> &'static str;
    /// Reads the stored snapshot; `None` when the backend holds no data.
    fn load(&self) -> RepoResult<Option<StateSnapshot>>;
    /// Overwrites the stored snapshot.
    fn save(&self, state: &AppState, prefs: &DisplayPrefs) -> RepoResult<()>;
}
