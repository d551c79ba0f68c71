//! Checkpoint scoring against targets.
//!
//! Each tracked metric is marked met or not, and may additionally be marked
//! significantly ahead. The verdict is:
//!
//! - AHEAD: at least 80% met and at least one metric significantly ahead
//! - ON_TRACK: at least 60% met (or no targets at all)
//! - BEHIND: otherwise

use optivita_core::{Metric, MetricOutcome, TargetMetrics, Verdict};

use crate::aggregate::{round2, ObservedMetrics};

/// Weight/waist reductions this far past target (x1.2) count as ahead.
const CHANGE_AHEAD_FACTOR: f64 = 1.2;
/// Steps this far past target (x1.1) count as ahead.
const STEPS_AHEAD_FACTOR: f64 = 1.1;
/// Extra training days per week that count as ahead.
const TRAINING_AHEAD_MARGIN: f64 = 1.0;
/// Extra compliance points that count as ahead.
const DIET_AHEAD_MARGIN: f64 = 10.0;

/// Per-metric outcomes for one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scorecard {
    outcomes: Vec<MetricOutcome>,
}

impl Scorecard {
    /// Score observed metrics against the checkpoint's targets.
    pub fn score(targets: Option<&TargetMetrics>, observed: &ObservedMetrics) -> Self {
        let Some(targets) = targets else {
            return Self::default();
        };

        let mut outcomes = Vec::with_capacity(targets.tracked_count());

        if let Some(target) = targets.target_weight_change_kg {
            let (met, ahead) = score_change(observed.weight_change_kg, target, true);
            outcomes.push(outcome(Metric::WeightChange, observed.weight_change_kg, target, met, ahead));
        }
        if let Some(target) = targets.target_waist_change_cm {
            let (met, ahead) = score_change(observed.waist_change_cm, target, false);
            outcomes.push(outcome(Metric::WaistChange, observed.waist_change_cm, target, met, ahead));
        }
        if let Some(target) = targets.training_days_per_week.map(f64::from) {
            let met = observed.avg_workouts >= target;
            let ahead = met && observed.avg_workouts >= target + TRAINING_AHEAD_MARGIN;
            outcomes.push(outcome(Metric::TrainingDays, observed.avg_workouts, target, met, ahead));
        }
        if let Some(target) = targets.steps_average.map(f64::from) {
            let met = observed.avg_steps >= target;
            let ahead = met && observed.avg_steps >= target * STEPS_AHEAD_FACTOR;
            outcomes.push(outcome(Metric::Steps, observed.avg_steps, target, met, ahead));
        }
        if let Some(target) = targets.diet_compliance_target.map(f64::from) {
            let met = observed.avg_diet_compliance >= target;
            let ahead = met && observed.avg_diet_compliance >= target + DIET_AHEAD_MARGIN;
            outcomes.push(outcome(
                Metric::DietCompliance,
                observed.avg_diet_compliance,
                target,
                met,
                ahead,
            ));
        }

        Self { outcomes }
    }

    /// Number of tracked metrics.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of tracked metrics that met their target.
    pub fn met(&self) -> usize {
        self.outcomes.iter().filter(|o| o.met).count()
    }

    /// True when any metric was significantly ahead.
    pub fn any_significantly_ahead(&self) -> bool {
        self.outcomes.iter().any(|o| o.significantly_ahead)
    }

    /// Overall verdict. No tracked metrics reads as ON_TRACK.
    pub fn verdict(&self) -> Verdict {
        let (met, total) = (self.met(), self.total());
        if total == 0 {
            return Verdict::OnTrack;
        }
        // met/total >= 0.8 and >= 0.6, in integers
        if met * 5 >= total * 4 && self.any_significantly_ahead() {
            Verdict::Ahead
        } else if met * 5 >= total * 3 {
            Verdict::OnTrack
        } else {
            Verdict::Behind
        }
    }

    /// Per-metric outcomes in metric order.
    pub fn outcomes(&self) -> &[MetricOutcome] {
        &self.outcomes
    }

    /// Consume into the outcome list.
    pub fn into_outcomes(self) -> Vec<MetricOutcome> {
        self.outcomes
    }
}

/// Score a net-change metric. Negative targets are reduction goals.
///
/// Gain goals only get an ahead flag when `ahead_on_gain` is set; the waist
/// metric has none.
fn score_change(observed: f64, target: f64, ahead_on_gain: bool) -> (bool, bool) {
    if target < 0.0 {
        (observed <= target, observed <= target * CHANGE_AHEAD_FACTOR)
    } else {
        let ahead = ahead_on_gain && observed >= target * CHANGE_AHEAD_FACTOR;
        (observed >= target, ahead)
    }
}

fn outcome(metric: Metric, observed: f64, target: f64, met: bool, significantly_ahead: bool) -> MetricOutcome {
    MetricOutcome {
        metric,
        observed: round2(observed),
        target,
        met,
        significantly_ahead,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero() -> ObservedMetrics {
        ObservedMetrics::default()
    }

    #[test]
    fn test_weight_loss_met_and_ahead() {
        let targets = TargetMetrics { target_weight_change_kg: Some(-3.0), ..Default::default() };
        let observed = ObservedMetrics { weight_change_kg: -4.0, ..zero() };

        let card = Scorecard::score(Some(&targets), &observed);
        assert_eq!(card.total(), 1);
        assert_eq!(card.met(), 1);
        assert!(card.any_significantly_ahead());
        assert_eq!(card.verdict(), Verdict::Ahead);
    }

    #[test]
    fn test_weight_loss_met_but_not_ahead() {
        let targets = TargetMetrics { target_weight_change_kg: Some(-3.0), ..Default::default() };
        let observed = ObservedMetrics { weight_change_kg: -3.2, ..zero() };

        let card = Scorecard::score(Some(&targets), &observed);
        assert_eq!(card.met(), 1);
        assert!(!card.any_significantly_ahead());
        assert_eq!(card.verdict(), Verdict::OnTrack);
    }

    #[test]
    fn test_diet_only_target_is_on_track_not_ahead() {
        let targets = TargetMetrics { diet_compliance_target: Some(80), ..Default::default() };
        let observed = ObservedMetrics { avg_diet_compliance: 85.0, ..zero() };

        let card = Scorecard::score(Some(&targets), &observed);
        assert_eq!((card.met(), card.total()), (1, 1));
        assert!(!card.any_significantly_ahead());
        assert_eq!(card.verdict(), Verdict::OnTrack);
    }

    #[test]
    fn test_two_of_five_is_behind() {
        let targets = TargetMetrics::new(-2.0, -2.0, 3, 8000, 75);
        let observed = ObservedMetrics {
            weight_change_kg: -2.2,
            waist_change_cm: -1.0,
            avg_workouts: 2.0,
            avg_steps: 8100.0,
            avg_diet_compliance: 60.0,
        };

        let card = Scorecard::score(Some(&targets), &observed);
        assert_eq!((card.met(), card.total()), (2, 5));
        assert!(!card.any_significantly_ahead());
        assert_eq!(card.verdict(), Verdict::Behind);
    }

    #[test]
    fn test_three_of_five_is_on_track_and_four_with_ahead_is_ahead() {
        let targets = TargetMetrics::new(-2.0, -2.0, 3, 8000, 75);
        let mut observed = ObservedMetrics {
            weight_change_kg: -2.0,
            waist_change_cm: -2.0,
            avg_workouts: 3.0,
            avg_steps: 7000.0,
            avg_diet_compliance: 70.0,
        };
        let card = Scorecard::score(Some(&targets), &observed);
        assert_eq!(card.met(), 3);
        assert_eq!(card.verdict(), Verdict::OnTrack);

        observed.avg_diet_compliance = 85.0;
        let card = Scorecard::score(Some(&targets), &observed);
        assert_eq!(card.met(), 4);
        assert!(card.any_significantly_ahead());
        assert_eq!(card.verdict(), Verdict::Ahead);
    }

    #[test]
    fn test_full_marks_without_ahead_flag_is_on_track() {
        let targets = TargetMetrics::new(-1.0, -1.0, 3, 7000, 70);
        let observed = ObservedMetrics {
            weight_change_kg: -1.1,
            waist_change_cm: -1.0,
            avg_workouts: 3.5,
            avg_steps: 7500.0,
            avg_diet_compliance: 75.0,
        };
        let card = Scorecard::score(Some(&targets), &observed);
        assert_eq!(card.met(), 5);
        assert!(!card.any_significantly_ahead());
        assert_eq!(card.verdict(), Verdict::OnTrack);
    }

    #[test]
    fn test_gain_targets() {
        let targets = TargetMetrics {
            target_weight_change_kg: Some(2.0),
            target_waist_change_cm: Some(1.0),
            ..Default::default()
        };
        let observed = ObservedMetrics { weight_change_kg: 2.5, waist_change_cm: 5.0, ..zero() };

        let card = Scorecard::score(Some(&targets), &observed);
        let weight = &card.outcomes()[0];
        let waist = &card.outcomes()[1];
        assert!(weight.met && weight.significantly_ahead);
        // waist gain goals never carry an ahead flag
        assert!(waist.met && !waist.significantly_ahead);
    }

    #[test]
    fn test_threshold_margins() {
        let targets = TargetMetrics {
            training_days_per_week: Some(4),
            steps_average: Some(9000),
            ..Default::default()
        };

        let observed = ObservedMetrics { avg_workouts: 4.75, avg_steps: 9899.0, ..zero() };
        let card = Scorecard::score(Some(&targets), &observed);
        assert_eq!(card.met(), 2);
        assert!(!card.any_significantly_ahead());

        let observed = ObservedMetrics { avg_workouts: 5.0, avg_steps: 9899.0, ..zero() };
        assert!(Scorecard::score(Some(&targets), &observed).outcomes()[0].significantly_ahead);

        let observed = ObservedMetrics { avg_workouts: 4.0, avg_steps: 9900.0, ..zero() };
        assert!(Scorecard::score(Some(&targets), &observed).outcomes()[1].significantly_ahead);
    }

    #[test]
    fn test_no_targets() {
        let card = Scorecard::score(None, &zero());
        assert_eq!(card.total(), 0);
        assert_eq!(card.verdict(), Verdict::OnTrack);

        let card = Scorecard::score(Some(&TargetMetrics::default()), &zero());
        assert_eq!(card.total(), 0);
        assert_eq!(card.verdict(), Verdict::OnTrack);
    }
}
