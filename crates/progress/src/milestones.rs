//! Milestone template generation.
//!
//! Every program gets the same five checkpoints, dated from its start:
//!
//! ```text
//! start + 14 days   Kickoff / Habit Lock-in    FOUNDATION
//! start + 1 month   30-Day Foundation          FOUNDATION
//! start + 3 months  12-Week Fat Loss           CUT_1
//! start + 6 months  6-Month Recomposition      BUILD
//! start + 12 months 12-Month Peak / Maintain   MAINTAIN
//! ```
//!
//! Month offsets use calendar arithmetic and clamp to the last day of the
//! target month (Jan 31 + 1 month = Feb 28 or 29).

use chrono::{Days, Months, NaiveDate};
use optivita_core::{
    Checkpoint, CheckpointId, CheckpointPhase, CheckpointStatus, FocusTag, ProgramId, TargetMetrics,
};

use crate::error::{ProgramError, Result};

/// Offset of a milestone from the program start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    /// Whole days
    Days(u64),
    /// Calendar months, clamped to month end
    Months(u32),
}

impl Offset {
    /// Apply the offset to `start`. `None` when the result leaves chrono's range.
    pub fn apply(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Offset::Days(days) => start.checked_add_days(Days::new(days)),
            Offset::Months(months) => start.checked_add_months(Months::new(months)),
        }
    }
}

/// One row of the milestone template.
#[derive(Debug, Clone, Copy)]
pub struct MilestoneTemplate {
    /// Distance from the program start
    pub offset: Offset,
    /// Checkpoint title
    pub title: &'static str,
    /// Training phase
    pub phase: CheckpointPhase,
    /// Focus areas, in display order
    pub focus_tags: &'static [FocusTag],
    /// Target weight change (kg)
    pub weight_change_kg: f64,
    /// Target waist change (cm)
    pub waist_change_cm: f64,
    /// Target training days per week
    pub training_days_per_week: u32,
    /// Target daily steps
    pub steps_average: u32,
    /// Target diet compliance (%)
    pub diet_compliance: u32,
}

impl MilestoneTemplate {
    fn targets(&self) -> TargetMetrics {
        TargetMetrics::new(
            self.weight_change_kg,
            self.waist_change_cm,
            self.training_days_per_week,
            self.steps_average,
            self.diet_compliance,
        )
    }
}

/// The standard 12-month transformation schedule, in date order.
pub const MILESTONES: [MilestoneTemplate; 5] = [
    MilestoneTemplate {
        offset: Offset::Days(14),
        title: "Kickoff / Habit Lock-in",
        phase: CheckpointPhase::Foundation,
        focus_tags: &[FocusTag::Habits, FocusTag::Cardio],
        weight_change_kg: -1.0,
        waist_change_cm: -1.0,
        training_days_per_week: 3,
        steps_average: 7000,
        diet_compliance: 70,
    },
    MilestoneTemplate {
        offset: Offset::Months(1),
        title: "30-Day Foundation",
        phase: CheckpointPhase::Foundation,
        focus_tags: &[FocusTag::Habits, FocusTag::Mobility, FocusTag::Cardio],
        weight_change_kg: -2.0,
        waist_change_cm: -2.0,
        training_days_per_week: 3,
        steps_average: 8000,
        diet_compliance: 75,
    },
    MilestoneTemplate {
        offset: Offset::Months(3),
        title: "12-Week Fat Loss",
        phase: CheckpointPhase::Cut1,
        focus_tags: &[FocusTag::Cardio, FocusTag::Abs, FocusTag::Habits],
        weight_change_kg: -6.0,
        waist_change_cm: -5.0,
        training_days_per_week: 4,
        steps_average: 9000,
        diet_compliance: 80,
    },
    MilestoneTemplate {
        offset: Offset::Months(6),
        title: "6-Month Recomposition",
        phase: CheckpointPhase::Build,
        focus_tags: &[FocusTag::Strength, FocusTag::Abs, FocusTag::Cardio],
        weight_change_kg: -10.0,
        waist_change_cm: -8.0,
        training_days_per_week: 5,
        steps_average: 9500,
        diet_compliance: 82,
    },
    MilestoneTemplate {
        offset: Offset::Months(12),
        title: "12-Month Peak / Maintain",
        phase: CheckpointPhase::Maintain,
        focus_tags: &[FocusTag::Strength, FocusTag::Mobility, FocusTag::Habits],
        weight_change_kg: -14.0,
        waist_change_cm: -12.0,
        training_days_per_week: 4,
        steps_average: 10000,
        diet_compliance: 85,
    },
];

/// Generate the five standard checkpoints for a program starting on `start`.
///
/// The output depends only on `start` (IDs aside). All checkpoints begin
/// UPCOMING at version 0.
pub fn generate_milestones(program_id: ProgramId, start: NaiveDate) -> Result<Vec<Checkpoint>> {
    MILESTONES
        .iter()
        .map(|template| {
            let checkpoint_date = template.offset.apply(start).ok_or_else(|| {
                ProgramError::InvalidRequest(format!(
                    "start date {} is too far out to schedule '{}'",
                    start, template.title
                ))
            })?;

            Ok(Checkpoint {
                id: CheckpointId::new(),
                program_id,
                checkpoint_date,
                title: template.title.to_string(),
                phase: template.phase,
                focus_tags: template.focus_tags.to_vec(),
                target_metrics: Some(template.targets()),
                target_weight_kg: None,
                notes: None,
                status: CheckpointStatus::Upcoming,
                version: 0,
            })
        })
        .collect()
}
