//! Optivita core data models.
//!
//! This crate defines the data structures of a transformation program:
//! the program itself, its milestone checkpoints with their targets, the
//! progress snapshots logged against it, and the evaluation result derived
//! from both.

#![warn(missing_docs)]

// Core identities
mod id;

// Program and its children
mod program;
mod checkpoint;
mod target;
mod entry;

// Derived results
mod evaluation;

// Re-exports
pub use id::*;

pub use program::{Program, NewProgram, ProgramPatch};
pub use checkpoint::{
    Checkpoint, CheckpointPatch, CheckpointPhase, CheckpointStatus, FocusTag, ParseEnumError,
};
pub use target::TargetMetrics;
pub use entry::{ProgressEntry, NewProgressEntry, EntryValidationError};
pub use evaluation::{EvaluationResult, Metric, MetricOutcome, Verdict};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
