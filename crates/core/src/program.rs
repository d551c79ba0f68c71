//! Program model - a fixed-duration transformation plan and everything it owns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::checkpoint::Checkpoint;
use crate::entry::ProgressEntry;
use crate::id::{CheckpointId, OwnerId, ProgramId, ProgressEntryId};
use crate::Time;

/// A transformation program.
///
/// The program exclusively owns its checkpoints and progress entries; they
/// are stored and deleted together with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Unique identifier
    pub id: ProgramId,

    /// Owning user
    pub owner: OwnerId,

    /// First day of the program
    pub start_date: NaiveDate,

    /// Last day of the program
    pub end_date: NaiveDate,

    /// Free-text notes
    pub notes: Option<String>,

    /// Milestones, ascending by date
    pub checkpoints: Vec<Checkpoint>,

    /// Progress snapshots, ascending by date
    pub progress_entries: Vec<ProgressEntry>,

    /// Optimistic concurrency revision, bumped by the store on every write
    pub revision: u64,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

impl Program {
    /// Create an empty program. Checkpoints are attached separately.
    pub fn new(
        owner: OwnerId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        notes: Option<String>,
        now: Time,
    ) -> Self {
        Self {
            id: ProgramId::new(),
            owner,
            start_date,
            end_date,
            notes,
            checkpoints: Vec::new(),
            progress_entries: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Find a checkpoint by ID.
    pub fn checkpoint(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| c.id == id)
    }

    /// Find a checkpoint by ID for mutation.
    pub fn checkpoint_mut(&mut self, id: CheckpointId) -> Option<&mut Checkpoint> {
        self.checkpoints.iter_mut().find(|c| c.id == id)
    }

    /// Replace the whole checkpoint set.
    pub fn replace_checkpoints(&mut self, mut checkpoints: Vec<Checkpoint>) {
        checkpoints.sort_by_key(|c| c.checkpoint_date);
        self.checkpoints = checkpoints;
    }

    /// Insert a progress entry, keeping entries ordered by date.
    pub fn push_entry(&mut self, entry: ProgressEntry) {
        let idx = self
            .progress_entries
            .partition_point(|e| (e.date, e.created_at) <= (entry.date, entry.created_at));
        self.progress_entries.insert(idx, entry);
    }

    /// Remove a progress entry, returning it if it existed.
    pub fn remove_entry(&mut self, id: ProgressEntryId) -> Option<ProgressEntry> {
        let idx = self.progress_entries.iter().position(|e| e.id == id)?;
        Some(self.progress_entries.remove(idx))
    }
}

/// Request to create a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProgram {
    /// First day of the program
    pub start_date: NaiveDate,
    /// Last day; defaults to start + the configured duration
    pub end_date: Option<NaiveDate>,
    /// Notes
    pub notes: Option<String>,
}

/// Partial update request for a program.
///
/// Changing the start date never shifts checkpoints; regeneration is a
/// separate, explicit operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramPatch {
    /// New start date
    pub start_date: Option<NaiveDate>,
    /// New end date
    pub end_date: Option<NaiveDate>,
    /// New notes
    pub notes: Option<String>,
}

impl ProgramPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.notes.is_none()
    }
}
