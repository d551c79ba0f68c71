//! Progress window selection.
//!
//! Evaluation looks only at the most recent handful of snapshots recorded
//! strictly before the checkpoint date.

use chrono::NaiveDate;
use optivita_core::ProgressEntry;
use optivita_storage::newest_before;

use crate::error::{ProgramError, Result};

/// Default number of snapshots considered by an evaluation.
pub const EVALUATION_WINDOW: usize = 4;

/// The bounded, newest-first set of snapshots preceding a checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressWindow {
    before: NaiveDate,
    entries: Vec<ProgressEntry>,
}

impl ProgressWindow {
    /// Select from an in-memory entry list.
    pub fn select(entries: &[ProgressEntry], before: NaiveDate, limit: usize) -> Self {
        Self {
            before,
            entries: newest_before(entries, before, limit),
        }
    }

    /// Fail with [`ProgramError::NoProgressData`] when the window is empty.
    pub fn require_data(self) -> Result<Self> {
        if self.entries.is_empty() {
            return Err(ProgramError::NoProgressData { checkpoint_date: self.before });
        }
        Ok(self)
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[ProgressEntry] {
        &self.entries
    }

    /// Number of entries in the window.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded before the checkpoint.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
