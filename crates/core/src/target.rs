//! Target schema - quantitative goals for a checkpoint period.

use serde::{Deserialize, Serialize};

/// Quantitative targets for a single checkpoint period.
///
/// Every field is optional; `None` means the metric is not tracked for this
/// period and is left out of evaluation entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetMetrics {
    /// Expected weight change in kg by this checkpoint.
    /// Negative means a loss goal (-4.0 = lose 4 kg).
    pub target_weight_change_kg: Option<f64>,

    /// Expected waist circumference change in cm. Negative means reduction.
    pub target_waist_change_cm: Option<f64>,

    /// Minimum training sessions per week.
    pub training_days_per_week: Option<u32>,

    /// Daily step target.
    pub steps_average: Option<u32>,

    /// Diet compliance percentage target (0-100).
    pub diet_compliance_target: Option<u32>,
}

impl TargetMetrics {
    /// Build a fully specified target set.
    pub fn new(
        weight_change_kg: f64,
        waist_change_cm: f64,
        training_days_per_week: u32,
        steps_average: u32,
        diet_compliance: u32,
    ) -> Self {
        Self {
            target_weight_change_kg: Some(weight_change_kg),
            target_waist_change_cm: Some(waist_change_cm),
            training_days_per_week: Some(training_days_per_week),
            steps_average: Some(steps_average),
            diet_compliance_target: Some(diet_compliance),
        }
    }

    /// Number of metrics with a target set.
    pub fn tracked_count(&self) -> usize {
        [
            self.target_weight_change_kg.is_some(),
            self.target_waist_change_cm.is_some(),
            self.training_days_per_week.is_some(),
            self.steps_average.is_some(),
            self.diet_compliance_target.is_some(),
        ]
        .into_iter()
        .filter(|tracked| *tracked)
        .count()
    }

    /// True when no metric is tracked.
    pub fn is_empty(&self) -> bool {
        self.tracked_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_count() {
        assert_eq!(TargetMetrics::default().tracked_count(), 0);
        assert!(TargetMetrics::default().is_empty());

        let partial = TargetMetrics {
            diet_compliance_target: Some(80),
            steps_average: Some(9000),
            ..Default::default()
        };
        assert_eq!(partial.tracked_count(), 2);
        assert_eq!(TargetMetrics::new(-1.0, -1.0, 3, 7000, 70).tracked_count(), 5);
    }

    #[test]
    fn test_missing_fields_deserialize_as_untracked() {
        let targets: TargetMetrics =
            serde_json::from_str(r#"{"diet_compliance_target": 80}"#).unwrap();
        assert_eq!(targets.diet_compliance_target, Some(80));
        assert_eq!(targets.target_weight_change_kg, None);
    }
}
