//! Checkpoint progress overview.

use chrono::NaiveDate;
use optivita_core::{Checkpoint, CheckpointStatus, Program, ProgramId};
use serde::{Deserialize, Serialize};

/// Snapshot of how far a program has come through its checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramOverview {
    /// Program this overview describes
    pub program_id: ProgramId,

    /// Date the overview was computed for
    pub as_of: NaiveDate,

    /// Number of checkpoints
    pub total_checkpoints: usize,

    /// Checkpoints marked ACHIEVED
    pub achieved_checkpoints: usize,

    /// Achieved share, rounded to a whole percent
    pub percentage: u32,

    /// Earliest UPCOMING checkpoint dated after `as_of`
    pub next_checkpoint: Option<Checkpoint>,

    /// Days from `as_of` to the next checkpoint
    pub days_to_next: Option<i64>,
}

/// Compute the overview of `program` as of `today`.
pub fn overview(program: &Program, today: NaiveDate) -> ProgramOverview {
    let total = program.checkpoints.len();
    let achieved = program
        .checkpoints
        .iter()
        .filter(|c| c.status == CheckpointStatus::Achieved)
        .count();
    let percentage = if total > 0 {
        ((achieved as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    let next = program
        .checkpoints
        .iter()
        .filter(|c| c.status == CheckpointStatus::Upcoming && c.checkpoint_date > today)
        .min_by_key(|c| c.checkpoint_date)
        .cloned();
    let days_to_next = next
        .as_ref()
        .map(|c| c.checkpoint_date.signed_duration_since(today).num_days());

    ProgramOverview {
        program_id: program.id,
        as_of: today,
        total_checkpoints: total,
        achieved_checkpoints: achieved,
        percentage,
        next_checkpoint: next,
        days_to_next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestones::generate_milestones;
    use optivita_core::OwnerId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn program(start: NaiveDate) -> Program {
        let mut program = Program::new(
            OwnerId::new("alice"),
            start,
            date(2026, 1, 1),
            None,
            chrono::Utc::now(),
        );
        let checkpoints = generate_milestones(program.id, start).unwrap();
        program.replace_checkpoints(checkpoints);
        program
    }

    #[test]
    fn test_fresh_program() {
        let program = program(date(2025, 1, 1));
        let view = overview(&program, date(2025, 1, 1));

        assert_eq!(view.total_checkpoints, 5);
        assert_eq!(view.achieved_checkpoints, 0);
        assert_eq!(view.percentage, 0);
        assert_eq!(
            view.next_checkpoint.map(|c| c.checkpoint_date),
            Some(date(2025, 1, 15))
        );
        assert_eq!(view.days_to_next, Some(14));
    }

    #[test]
    fn test_achieved_and_skipped_checkpoints() {
        let mut program = program(date(2025, 1, 1));
        program.checkpoints[0].status = CheckpointStatus::Achieved;
        program.checkpoints[1].status = CheckpointStatus::Missed;
        program.checkpoints[2].status = CheckpointStatus::Skipped;

        let view = overview(&program, date(2025, 2, 10));
        assert_eq!(view.achieved_checkpoints, 1);
        assert_eq!(view.percentage, 20);
        // the skipped 3-month mark is still ahead but no longer counts as next
        assert_eq!(
            view.next_checkpoint.map(|c| c.checkpoint_date),
            Some(date(2025, 7, 1))
        );
        assert_eq!(view.days_to_next, Some(141));
    }

    #[test]
    fn test_rounds_percentage() {
        let mut program = program(date(2025, 1, 1));
        program.checkpoints.truncate(3);
        program.checkpoints[0].status = CheckpointStatus::Achieved;
        program.checkpoints[1].status = CheckpointStatus::Achieved;

        assert_eq!(overview(&program, date(2025, 1, 1)).percentage, 67);
    }

    #[test]
    fn test_no_checkpoints_left() {
        let program = program(date(2024, 1, 1));
        let view = overview(&program, date(2025, 6, 1));
        assert_eq!(view.next_checkpoint, None);
        assert_eq!(view.days_to_next, None);

        let mut empty = program.clone();
        empty.checkpoints.clear();
        assert_eq!(overview(&empty, date(2025, 6, 1)).percentage, 0);
    }
}
