//! Evaluation result types - derived, never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::id::CheckpointId;

/// Overall classification of a checkpoint evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Most targets met and at least one clearly exceeded
    Ahead,
    /// Enough targets met to stay the course
    OnTrack,
    /// Too few targets met
    Behind,
}

impl Verdict {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ahead => "AHEAD",
            Verdict::OnTrack => "ON_TRACK",
            Verdict::Behind => "BEHIND",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric that can carry a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    /// Net weight change (kg)
    WeightChange,
    /// Net waist change (cm)
    WaistChange,
    /// Workouts per period
    TrainingDays,
    /// Average daily steps
    Steps,
    /// Diet compliance (%)
    DietCompliance,
}

impl Metric {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::WeightChange => "weight change",
            Metric::WaistChange => "waist change",
            Metric::TrainingDays => "training days",
            Metric::Steps => "steps",
            Metric::DietCompliance => "diet compliance",
        }
    }
}

/// How one tracked metric compared with its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricOutcome {
    /// Which metric
    pub metric: Metric,
    /// Observed aggregate, rounded to 2 decimals
    pub observed: f64,
    /// Target value
    pub target: f64,
    /// Target reached
    pub met: bool,
    /// Target exceeded by the metric's margin
    pub significantly_ahead: bool,
}

/// Result of evaluating a checkpoint against recent progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Evaluated checkpoint
    pub checkpoint_id: CheckpointId,
    /// Its title
    pub checkpoint_title: String,
    /// Its date; only entries before it are analyzed
    pub checkpoint_date: NaiveDate,

    /// Overall verdict
    pub verdict: Verdict,

    /// Human-readable summary
    pub summary: String,

    /// Number of progress entries in the window
    pub entries_analyzed: usize,

    /// Newest minus oldest weight in the window (kg)
    pub avg_weight_change_kg: f64,
    /// Weight change target
    pub target_weight_change_kg: Option<f64>,
    /// Newest minus oldest waist in the window (cm)
    pub avg_waist_change_cm: f64,
    /// Waist change target
    pub target_waist_change_cm: Option<f64>,
    /// Mean workouts per snapshot
    pub avg_workouts_per_week: f64,
    /// Training days target
    pub target_training_days_per_week: Option<u32>,
    /// Mean daily steps
    pub avg_steps_avg: f64,
    /// Steps target
    pub target_steps_average: Option<u32>,
    /// Mean diet compliance
    pub avg_diet_compliance: f64,
    /// Diet compliance target
    pub target_diet_compliance: Option<u32>,

    /// Per-metric outcomes, for tracked metrics only
    pub outcomes: Vec<MetricOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_wire_names() {
        assert_eq!(serde_json::to_string(&Verdict::OnTrack).unwrap(), "\"ON_TRACK\"");
        assert_eq!(Verdict::Ahead.to_string(), "AHEAD");
        assert_eq!(Verdict::Behind.as_str(), "BEHIND");
    }
}
