//! Evaluation report assembly.

use optivita_core::{Checkpoint, EvaluationResult, Verdict};

use crate::aggregate::{round2, ObservedMetrics};
use crate::scorer::Scorecard;
use crate::window::ProgressWindow;

const NO_TARGETS_SUMMARY: &str = "No target metrics defined for this checkpoint. \
     Set target metrics to get a scored evaluation.";

/// Build the evaluation result for `checkpoint` from a non-empty window.
pub fn build_report(checkpoint: &Checkpoint, window: &ProgressWindow) -> EvaluationResult {
    let observed = ObservedMetrics::from_window(window.entries());
    let targets = checkpoint.target_metrics.as_ref();
    let card = Scorecard::score(targets, &observed);
    let verdict = card.verdict();
    let summary = summarize(&card, verdict);

    EvaluationResult {
        checkpoint_id: checkpoint.id,
        checkpoint_title: checkpoint.title.clone(),
        checkpoint_date: checkpoint.checkpoint_date,
        verdict,
        summary,
        entries_analyzed: window.len(),
        avg_weight_change_kg: round2(observed.weight_change_kg),
        target_weight_change_kg: targets.and_then(|t| t.target_weight_change_kg),
        avg_waist_change_cm: round2(observed.waist_change_cm),
        target_waist_change_cm: targets.and_then(|t| t.target_waist_change_cm),
        avg_workouts_per_week: round2(observed.avg_workouts),
        target_training_days_per_week: targets.and_then(|t| t.training_days_per_week),
        avg_steps_avg: round2(observed.avg_steps),
        target_steps_average: targets.and_then(|t| t.steps_average),
        avg_diet_compliance: round2(observed.avg_diet_compliance),
        target_diet_compliance: targets.and_then(|t| t.diet_compliance_target),
        outcomes: card.into_outcomes(),
    }
}

/// Human-readable summary quoting the exact met/total fraction.
pub fn summarize(card: &Scorecard, verdict: Verdict) -> String {
    let (met, total) = (card.met(), card.total());
    if total == 0 {
        return NO_TARGETS_SUMMARY.to_string();
    }
    match verdict {
        Verdict::Ahead => format!(
            "Excellent progress: {}/{} targets met with at least one well ahead of plan. \
             You are ahead of schedule.",
            met, total
        ),
        Verdict::OnTrack => format!(
            "Solid progress: {}/{} targets met. Keep the current trajectory.",
            met, total
        ),
        Verdict::Behind => format!(
            "Only {}/{} targets met. Review diet compliance and training consistency.",
            met, total
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use optivita_core::{
        CheckpointId, CheckpointPhase, CheckpointStatus, NewProgressEntry, ProgramId, ProgressEntry,
        TargetMetrics,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn checkpoint(targets: Option<TargetMetrics>) -> Checkpoint {
        Checkpoint {
            id: CheckpointId::new(),
            program_id: ProgramId::new(),
            checkpoint_date: date(2025, 4, 1),
            title: "30-Day Foundation".to_string(),
            phase: CheckpointPhase::Foundation,
            focus_tags: Vec::new(),
            target_metrics: targets,
            target_weight_kg: None,
            notes: None,
            status: CheckpointStatus::Upcoming,
            version: 0,
        }
    }

    fn entry(day: NaiveDate, fields: NewProgressEntry) -> ProgressEntry {
        NewProgressEntry { date: Some(day), ..fields }
            .into_entry(ProgramId::new(), date(2030, 1, 1), chrono::Utc::now())
            .unwrap()
    }

    #[test]
    fn test_weight_loss_ahead_of_target() {
        let entries = vec![
            entry(date(2025, 3, 1), NewProgressEntry { weight_kg: Some(80.0), ..Default::default() }),
            entry(date(2025, 3, 20), NewProgressEntry { weight_kg: Some(76.0), ..Default::default() }),
        ];
        let targets = TargetMetrics { target_weight_change_kg: Some(-3.0), ..Default::default() };
        let cp = checkpoint(Some(targets));
        let window = ProgressWindow::select(&entries, cp.checkpoint_date, 4);

        let report = build_report(&cp, &window);
        assert_eq!(report.avg_weight_change_kg, -4.0);
        assert_eq!(report.target_weight_change_kg, Some(-3.0));
        assert_eq!(report.verdict, Verdict::Ahead);
        assert!(report.outcomes[0].met && report.outcomes[0].significantly_ahead);
        assert!(report.summary.contains("1/1"));
        assert_eq!(report.entries_analyzed, 2);
    }

    #[test]
    fn test_behind_summary_quotes_fraction() {
        let entries = vec![
            entry(
                date(2025, 3, 1),
                NewProgressEntry {
                    weight_kg: Some(90.0),
                    waist_cm: Some(100.0),
                    workouts_completed: Some(2),
                    steps_avg: Some(8100),
                    diet_compliance_score: Some(60),
                    ..Default::default()
                },
            ),
            entry(
                date(2025, 3, 25),
                NewProgressEntry {
                    weight_kg: Some(87.8),
                    waist_cm: Some(99.0),
                    workouts_completed: Some(2),
                    steps_avg: Some(8100),
                    diet_compliance_score: Some(60),
                    ..Default::default()
                },
            ),
        ];
        let cp = checkpoint(Some(TargetMetrics::new(-2.0, -2.0, 3, 8000, 75)));
        let window = ProgressWindow::select(&entries, cp.checkpoint_date, 4);

        let report = build_report(&cp, &window);
        assert_eq!(report.verdict, Verdict::Behind);
        assert!(report.summary.contains("2/5"), "summary: {}", report.summary);
        assert_eq!(report.outcomes.len(), 5);
    }

    #[test]
    fn test_no_targets_reports_on_track() {
        let entries = vec![
            entry(date(2025, 3, 1), NewProgressEntry { steps_avg: Some(5000), ..Default::default() }),
            entry(date(2025, 3, 8), NewProgressEntry { steps_avg: Some(6001), ..Default::default() }),
            entry(date(2025, 3, 15), NewProgressEntry { steps_avg: Some(7000), ..Default::default() }),
        ];
        let cp = checkpoint(None);
        let window = ProgressWindow::select(&entries, cp.checkpoint_date, 4);

        let report = build_report(&cp, &window);
        assert_eq!(report.verdict, Verdict::OnTrack);
        assert!(report.summary.contains("No target metrics defined"));
        assert_eq!(report.entries_analyzed, 3);
        assert_eq!(report.avg_steps_avg, 6000.33);
        assert!(report.outcomes.is_empty());
        assert_eq!(report.target_steps_average, None);
    }
}
