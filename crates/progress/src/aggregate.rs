//! Metric aggregation over a progress window.

use optivita_core::ProgressEntry;

/// Observed values reduced from a progress window.
///
/// Values are kept unrounded; [`round2`] is applied only when reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservedMetrics {
    /// Newest minus oldest weight (kg)
    pub weight_change_kg: f64,
    /// Newest minus oldest waist (cm)
    pub waist_change_cm: f64,
    /// Mean workouts completed per entry (each entry covers about a week)
    pub avg_workouts: f64,
    /// Mean of the per-entry step averages
    pub avg_steps: f64,
    /// Mean diet compliance score
    pub avg_diet_compliance: f64,
}

impl ObservedMetrics {
    /// Reduce a newest-first window. Only entries carrying a field contribute
    /// to that field's aggregate.
    pub fn from_window(entries: &[ProgressEntry]) -> Self {
        Self {
            weight_change_kg: net_change(entries.iter().filter_map(|e| e.weight_kg)),
            waist_change_cm: net_change(entries.iter().filter_map(|e| e.waist_cm)),
            avg_workouts: mean(entries.iter().filter_map(|e| e.workouts_completed.map(f64::from))),
            avg_steps: mean(entries.iter().filter_map(|e| e.steps_avg.map(f64::from))),
            avg_diet_compliance: mean(
                entries.iter().filter_map(|e| e.diet_compliance_score.map(f64::from)),
            ),
        }
    }
}

/// Newest minus oldest of a newest-first series.
///
/// Fewer than two values count as no change (0.0), not as missing data.
fn net_change(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    match (values.first(), values.last()) {
        (Some(newest), Some(oldest)) if values.len() >= 2 => newest - oldest,
        _ => 0.0,
    }
}

/// Arithmetic mean; 0.0 for an empty series.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Round to two decimals, halves rounding up.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use optivita_core::{NewProgressEntry, ProgramId};

    /// Build a newest-first window; `rows` are given oldest first.
    fn window(rows: &[NewProgressEntry]) -> Vec<ProgressEntry> {
        let program_id = ProgramId::new();
        let mut entries: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, fields)| {
                let day = NaiveDate::from_ymd_opt(2025, 1, 1 + 7 * i as u32).unwrap();
                NewProgressEntry { date: Some(day), ..fields.clone() }
                    .into_entry(program_id, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), chrono::Utc::now())
                    .unwrap()
            })
            .collect();
        entries.reverse();
        entries
    }

    #[test]
    fn test_weight_change_is_newest_minus_oldest() {
        let entries = window(&[
            NewProgressEntry { weight_kg: Some(80.0), ..Default::default() },
            NewProgressEntry { weight_kg: Some(76.0), ..Default::default() },
        ]);
        let observed = ObservedMetrics::from_window(&entries);
        assert_eq!(observed.weight_change_kg, -4.0);
    }

    #[test]
    fn test_change_skips_entries_without_the_field() {
        let entries = window(&[
            NewProgressEntry { waist_cm: Some(100.0), ..Default::default() },
            NewProgressEntry { waist_cm: None, weight_kg: Some(90.0), ..Default::default() },
            NewProgressEntry { waist_cm: Some(97.5), ..Default::default() },
        ]);
        let observed = ObservedMetrics::from_window(&entries);
        assert_eq!(observed.waist_change_cm, -2.5);
        // one weight reading only: no trend
        assert_eq!(observed.weight_change_kg, 0.0);
    }

    #[test]
    fn test_averages_ignore_missing_values() {
        let entries = window(&[
            NewProgressEntry { steps_avg: Some(8000), workouts_completed: Some(3), ..Default::default() },
            NewProgressEntry { steps_avg: None, workouts_completed: Some(4), diet_compliance_score: Some(90), ..Default::default() },
            NewProgressEntry { steps_avg: Some(9000), workouts_completed: Some(5), diet_compliance_score: Some(80), ..Default::default() },
        ]);
        let observed = ObservedMetrics::from_window(&entries);
        assert_eq!(observed.avg_steps, 8500.0);
        assert_eq!(observed.avg_workouts, 4.0);
        assert_eq!(observed.avg_diet_compliance, 85.0);
    }

    #[test]
    fn test_empty_fields_aggregate_to_zero() {
        let entries = window(&[NewProgressEntry::default()]);
        assert_eq!(ObservedMetrics::from_window(&entries), ObservedMetrics::default());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(8333.333333), 8333.33);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(-4.0), -4.0);
        assert_eq!(round2(-1.006), -1.01);
    }
}
