//! Progress entries - frequent measurement snapshots within a program.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::id::{ProgramId, ProgressEntryId};
use crate::Time;

/// A weekly or bi-weekly progress snapshot linked to a program.
///
/// Unlike checkpoints, entries are lightweight and logged often. Evaluation
/// only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Unique identifier
    pub id: ProgressEntryId,

    /// Owning program
    pub program_id: ProgramId,

    /// Snapshot date (not necessarily the day it was logged)
    pub date: NaiveDate,

    /// Body weight in kilograms
    pub weight_kg: Option<f64>,

    /// Waist circumference in centimetres
    pub waist_cm: Option<f64>,

    /// Average daily steps during the tracked period
    pub steps_avg: Option<u32>,

    /// Workouts completed in the tracked period
    pub workouts_completed: Option<u32>,

    /// Self-reported diet compliance (0-100)
    pub diet_compliance_score: Option<u8>,

    /// Free-text notes
    pub notes: Option<String>,

    /// Photo references, in upload order
    pub photos: Vec<String>,

    /// When the entry was logged
    pub created_at: Time,
}

/// Request to log a new progress entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProgressEntry {
    /// Snapshot date
    pub date: Option<NaiveDate>,
    /// Body weight in kilograms
    pub weight_kg: Option<f64>,
    /// Waist circumference in centimetres
    pub waist_cm: Option<f64>,
    /// Average daily steps
    pub steps_avg: Option<u32>,
    /// Workouts completed
    pub workouts_completed: Option<u32>,
    /// Diet compliance score (0-100)
    pub diet_compliance_score: Option<u8>,
    /// Notes
    pub notes: Option<String>,
    /// Photo references
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Why a progress entry request was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryValidationError {
    /// No snapshot date supplied
    #[error("date is required")]
    MissingDate,

    /// Snapshot date lies after today
    #[error("date {date} must not be in the future (today is {today})")]
    FutureDate {
        /// Requested date
        date: NaiveDate,
        /// Today per the service clock
        today: NaiveDate,
    },

    /// Diet compliance above 100
    #[error("diet compliance score must be between 0 and 100, got {0}")]
    ComplianceOutOfRange(u8),

    /// Non-positive or non-finite body measurement
    #[error("{field} must be a positive number, got {value}")]
    InvalidMeasurement {
        /// Offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },
}

impl NewProgressEntry {
    /// Validate the request against `today` and build the entry.
    pub fn into_entry(
        self,
        program_id: ProgramId,
        today: NaiveDate,
        created_at: Time,
    ) -> Result<ProgressEntry, EntryValidationError> {
        let date = self.date.ok_or(EntryValidationError::MissingDate)?;
        if date > today {
            return Err(EntryValidationError::FutureDate { date, today });
        }
        if let Some(score) = self.diet_compliance_score {
            if score > 100 {
                return Err(EntryValidationError::ComplianceOutOfRange(score));
            }
        }
        check_measurement("weight_kg", self.weight_kg)?;
        check_measurement("waist_cm", self.waist_cm)?;

        Ok(ProgressEntry {
            id: ProgressEntryId::new(),
            program_id,
            date,
            weight_kg: self.weight_kg,
            waist_cm: self.waist_cm,
            steps_avg: self.steps_avg,
            workouts_completed: self.workouts_completed,
            diet_compliance_score: self.diet_compliance_score,
            notes: self.notes,
            photos: self.photos.into_iter().filter(|p| !p.trim().is_empty()).collect(),
            created_at,
        })
    }
}

fn check_measurement(field: &'static str, value: Option<f64>) -> Result<(), EntryValidationError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => {
            Err(EntryValidationError::InvalidMeasurement { field, value: v })
        }
        _ => Ok(()),
    }
}
