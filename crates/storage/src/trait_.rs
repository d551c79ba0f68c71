//! Storage trait abstraction.

use async_trait::async_trait;
use chrono::NaiveDate;
use optivita_core::{OwnerId, Program, ProgramId, ProgressEntry};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored revision differs from the one the write was based on
    #[error("Version conflict: expected revision {expected}, found {actual}")]
    VersionConflict {
        /// Revision the caller read
        expected: u64,
        /// Revision currently stored
        actual: u64,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Storage abstraction for Optivita data.
///
/// A program is stored as one aggregate together with its checkpoints and
/// progress entries, so every write below is atomic for the whole program.
/// All reads are scoped by owner: a program owned by someone else is
/// reported as absent.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a new program. Fails if the ID already exists.
    async fn create_program(&self, program: &Program) -> Result<()>;

    /// Load a program owned by `owner`.
    async fn load_program(&self, owner: &OwnerId, id: ProgramId) -> Result<Option<Program>>;

    /// List all programs owned by `owner`, newest start date first.
    async fn list_programs(&self, owner: &OwnerId) -> Result<Vec<Program>>;

    /// Replace a stored program if its revision still matches `program.revision`.
    ///
    /// Returns the new revision. A mismatch yields
    /// [`StorageError::VersionConflict`] and leaves the stored copy untouched.
    async fn update_program(&self, program: &Program) -> Result<u64>;

    /// Delete a program with everything it owns. Returns whether it existed.
    async fn delete_program(&self, owner: &OwnerId, id: ProgramId) -> Result<bool>;

    /// Most recent `limit` entries dated strictly before `before`, newest first.
    async fn recent_entries_before(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
        before: NaiveDate,
        limit: usize,
    ) -> Result<Vec<ProgressEntry>> {
        let program = self
            .load_program(owner, program_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("program {}", program_id)))?;
        Ok(newest_before(&program.progress_entries, before, limit))
    }
}

/// Select up to `limit` entries dated strictly before `before`, newest first.
///
/// Entries sharing a date are ordered by creation time, then ID, newest first.
pub fn newest_before(entries: &[ProgressEntry], before: NaiveDate, limit: usize) -> Vec<ProgressEntry> {
    let mut selected: Vec<ProgressEntry> = entries
        .iter()
        .filter(|e| e.date < before)
        .cloned()
        .collect();
    selected.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
    selected.truncate(limit);
    selected
}

/// Order programs newest start date first, ties by ID.
pub(crate) fn sort_programs(programs: &mut [Program]) {
    programs.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| b.id.cmp(&a.id)));
}

/// Check a write against the stored revision and return the next one.
pub(crate) fn next_revision(stored: u64, incoming: u64) -> Result<u64> {
    if stored != incoming {
        return Err(StorageError::VersionConflict { expected: incoming, actual: stored });
    }
    Ok(stored + 1)
}
