//! Error taxonomy for program operations.

use chrono::NaiveDate;
use optivita_core::EntryValidationError;
use optivita_storage::StorageError;

/// Result type for program operations.
pub type Result<T> = std::result::Result<T, ProgramError>;

/// Errors surfaced by the program service.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// Entity absent or not owned by the caller
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Requested ID
        id: String,
    },

    /// Request the caller can correct
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Evaluation attempted with no progress logged before the checkpoint
    #[error(
        "No progress entries found before checkpoint date {checkpoint_date}. \
         Log at least one progress entry to evaluate this checkpoint."
    )]
    NoProgressData {
        /// Date of the checkpoint being evaluated
        checkpoint_date: NaiveDate,
    },

    /// Write based on a stale version
    #[error("{entity} was modified concurrently: expected version {expected}, found {actual}")]
    VersionConflict {
        /// Entity kind
        entity: &'static str,
        /// Version the caller based the write on
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(StorageError),
}

/// Coarse classification a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Absent or foreign entity
    NotFound,
    /// Client-correctable request problem
    InvalidRequest,
    /// Concurrent modification; retry with fresh data is the caller's call
    VersionConflict,
    /// Backend failure
    Internal,
}

impl ProgramError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProgramError::NotFound { .. } => ErrorKind::NotFound,
            ProgramError::InvalidRequest(_) | ProgramError::NoProgressData { .. } => {
                ErrorKind::InvalidRequest
            }
            ProgramError::VersionConflict { .. } => ErrorKind::VersionConflict,
            ProgramError::Storage(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        ProgramError::NotFound { entity, id: id.to_string() }
    }
}

impl From<StorageError> for ProgramError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => {
                let id = what.strip_prefix("program ").unwrap_or(&what).to_string();
                ProgramError::NotFound { entity: "Program", id }
            }
            StorageError::VersionConflict { expected, actual } => {
                ProgramError::VersionConflict { entity: "Program", expected, actual }
            }
            other => ProgramError::Storage(other),
        }
    }
}

impl From<EntryValidationError> for ProgramError {
    fn from(err: EntryValidationError) -> Self {
        ProgramError::InvalidRequest(err.to_string())
    }
}
