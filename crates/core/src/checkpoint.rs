//! Checkpoint model - dated milestones within a program.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::id::{CheckpointId, ProgramId};
use crate::target::TargetMetrics;

/// A dated evaluation point within a program, with its own targets and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Unique identifier
    pub id: CheckpointId,

    /// Owning program
    pub program_id: ProgramId,

    /// Date the checkpoint falls on
    pub checkpoint_date: NaiveDate,

    /// Checkpoint title
    pub title: String,

    /// Training phase this checkpoint closes
    pub phase: CheckpointPhase,

    /// Training focus areas for the period
    pub focus_tags: Vec<FocusTag>,

    /// Quantitative targets for the period
    pub target_metrics: Option<TargetMetrics>,

    /// Absolute target weight (kg), kept apart from the target schema
    pub target_weight_kg: Option<f64>,

    /// Free-text notes
    pub notes: Option<String>,

    /// Lifecycle status
    pub status: CheckpointStatus,

    /// Optimistic concurrency version
    pub version: u64,
}

impl Checkpoint {
    /// Apply a partial update. Only fields present in the patch are written.
    ///
    /// Returns `true` when the patch carried at least one field, in which case
    /// the version has been incremented.
    pub fn apply(&mut self, patch: CheckpointPatch) -> bool {
        if patch.is_empty() {
            return false;
        }

        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(phase) = patch.phase {
            self.phase = phase;
        }
        if let Some(tags) = patch.focus_tags {
            self.focus_tags = dedup_tags(tags);
        }
        if let Some(targets) = patch.target_metrics {
            self.target_metrics = Some(targets);
        }
        if let Some(weight) = patch.target_weight_kg {
            self.target_weight_kg = Some(weight);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }

        self.version += 1;
        true
    }
}

fn dedup_tags(tags: Vec<FocusTag>) -> Vec<FocusTag> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Partial update request for a checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointPatch {
    /// New phase
    pub phase: Option<CheckpointPhase>,
    /// Replacement focus tags
    pub focus_tags: Option<Vec<FocusTag>>,
    /// Replacement target schema
    pub target_metrics: Option<TargetMetrics>,
    /// New legacy target weight
    pub target_weight_kg: Option<f64>,
    /// New notes
    pub notes: Option<String>,
    /// New status
    pub status: Option<CheckpointStatus>,
}

impl CheckpointPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.phase.is_none()
            && self.focus_tags.is_none()
            && self.target_metrics.is_none()
            && self.target_weight_kg.is_none()
            && self.notes.is_none()
            && self.status.is_none()
    }
}

/// Error returned when parsing one of the checkpoint enums from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Training phase of a transformation checkpoint.
///
/// Standard progression: FOUNDATION, CUT_1, BUILD, CUT_2, MAINTAIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckpointPhase {
    /// Habit formation and baseline tracking
    Foundation,
    /// Primary fat-loss phase
    #[serde(rename = "CUT_1")]
    Cut1,
    /// Recomposition and strength focus
    Build,
    /// Secondary definition cut
    #[serde(rename = "CUT_2")]
    Cut2,
    /// Maintenance and long-term adherence
    Maintain,
}

impl CheckpointPhase {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointPhase::Foundation => "FOUNDATION",
            CheckpointPhase::Cut1 => "CUT_1",
            CheckpointPhase::Build => "BUILD",
            CheckpointPhase::Cut2 => "CUT_2",
            CheckpointPhase::Maintain => "MAINTAIN",
        }
    }
}

impl std::fmt::Display for CheckpointPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckpointPhase {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "FOUNDATION" => Ok(CheckpointPhase::Foundation),
            "CUT_1" | "CUT1" => Ok(CheckpointPhase::Cut1),
            "BUILD" => Ok(CheckpointPhase::Build),
            "CUT_2" | "CUT2" => Ok(CheckpointPhase::Cut2),
            "MAINTAIN" => Ok(CheckpointPhase::Maintain),
            _ => Err(ParseEnumError { kind: "phase", value: s.to_string() }),
        }
    }
}

/// Training focus area. Several may apply to one checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusTag {
    /// Resistance training
    Strength,
    /// Conditioning and step count
    Cardio,
    /// Core work
    Abs,
    /// Flexibility and joint health
    Mobility,
    /// Sleep, diet and routine
    Habits,
}

impl FocusTag {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusTag::Strength => "STRENGTH",
            FocusTag::Cardio => "CARDIO",
            FocusTag::Abs => "ABS",
            FocusTag::Mobility => "MOBILITY",
            FocusTag::Habits => "HABITS",
        }
    }
}

impl std::fmt::Display for FocusTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FocusTag {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STRENGTH" => Ok(FocusTag::Strength),
            "CARDIO" => Ok(FocusTag::Cardio),
            "ABS" => Ok(FocusTag::Abs),
            "MOBILITY" => Ok(FocusTag::Mobility),
            "HABITS" => Ok(FocusTag::Habits),
            _ => Err(ParseEnumError { kind: "focus tag", value: s.to_string() }),
        }
    }
}

/// Checkpoint lifecycle status.
///
/// No transition graph is enforced: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckpointStatus {
    /// Not yet reached (initial)
    Upcoming,
    /// Currently being worked towards
    Active,
    /// Targets reached
    Achieved,
    /// Date passed without reaching targets
    Missed,
    /// Deliberately skipped
    Skipped,
}

impl CheckpointStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointStatus::Upcoming => "UPCOMING",
            CheckpointStatus::Active => "ACTIVE",
            CheckpointStatus::Achieved => "ACHIEVED",
            CheckpointStatus::Missed => "MISSED",
            CheckpointStatus::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckpointStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UPCOMING" => Ok(CheckpointStatus::Upcoming),
            "ACTIVE" => Ok(CheckpointStatus::Active),
            "ACHIEVED" => Ok(CheckpointStatus::Achieved),
            "MISSED" => Ok(CheckpointStatus::Missed),
            "SKIPPED" => Ok(CheckpointStatus::Skipped),
            _ => Err(ParseEnumError { kind: "status", value: s.to_string() }),
        }
    }
}
