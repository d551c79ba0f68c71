//! Program service - the operations callers drive.
//!
//! Every call is scoped by owner and performs at most one aggregate write,
//! guarded by the stored program revision.

use std::sync::Arc;

use chrono::{Months, NaiveDate};
use optivita_core::{
    Checkpoint, CheckpointId, CheckpointPatch, EvaluationResult, NewProgram, NewProgressEntry,
    OwnerId, Program, ProgramId, ProgramPatch, ProgressEntry, ProgressEntryId, TargetMetrics,
};
use optivita_storage::Storage;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::{ProgramError, Result};
use crate::milestones::generate_milestones;
use crate::report::build_report;
use crate::tracker::{overview, ProgramOverview};
use crate::window::{ProgressWindow, EVALUATION_WINDOW};

/// Configuration for the program service.
#[derive(Debug, Clone)]
pub struct ProgramServiceConfig {
    /// Snapshots considered by an evaluation
    pub evaluation_window: usize,
    /// Program length when no end date is given, in calendar months
    pub default_duration_months: u32,
}

impl Default for ProgramServiceConfig {
    fn default() -> Self {
        Self {
            evaluation_window: EVALUATION_WINDOW,
            default_duration_months: 12,
        }
    }
}

/// Program service.
pub struct ProgramService<S: Storage + ?Sized> {
    storage: Arc<S>,
    clock: Arc<dyn Clock>,
    config: ProgramServiceConfig,
}

impl<S: Storage + ?Sized> ProgramService<S> {
    /// Create a service over `storage` using the wall clock.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            config: ProgramServiceConfig::default(),
        }
    }

    /// Set the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ProgramServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Access the underlying store.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    // ---- programs ----

    /// Create a program and its five standard checkpoints.
    pub async fn create_program(&self, owner: &OwnerId, request: NewProgram) -> Result<Program> {
        let end_date = match request.end_date {
            Some(end) => end,
            None => request
                .start_date
                .checked_add_months(Months::new(self.config.default_duration_months))
                .ok_or_else(|| {
                    ProgramError::InvalidRequest(format!(
                        "start date {} is out of range",
                        request.start_date
                    ))
                })?,
        };
        check_dates(request.start_date, end_date)?;

        let mut program = Program::new(
            owner.clone(),
            request.start_date,
            end_date,
            request.notes,
            self.clock.now(),
        );
        let checkpoints = generate_milestones(program.id, program.start_date)?;
        program.replace_checkpoints(checkpoints);

        self.storage.create_program(&program).await?;
        info!(program = %program.id, owner = %owner, start = %program.start_date, "Created program");
        Ok(program)
    }

    /// Programs owned by `owner`, newest start date first.
    pub async fn list_programs(&self, owner: &OwnerId) -> Result<Vec<Program>> {
        Ok(self.storage.list_programs(owner).await?)
    }

    /// Load one program.
    pub async fn get_program(&self, owner: &OwnerId, program_id: ProgramId) -> Result<Program> {
        self.storage
            .load_program(owner, program_id)
            .await?
            .ok_or_else(|| ProgramError::not_found("Program", program_id))
    }

    /// Edit program fields. Checkpoints are never shifted; use
    /// [`regenerate_checkpoints`](Self::regenerate_checkpoints) for that.
    pub async fn update_program(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
        patch: ProgramPatch,
        expected_revision: Option<u64>,
    ) -> Result<Program> {
        let mut program = self.get_program(owner, program_id).await?;
        if let Some(expected) = expected_revision {
            if expected != program.revision {
                return Err(ProgramError::VersionConflict {
                    entity: "Program",
                    expected,
                    actual: program.revision,
                });
            }
        }
        if patch.is_empty() {
            return Ok(program);
        }

        if let Some(start) = patch.start_date {
            program.start_date = start;
        }
        if let Some(end) = patch.end_date {
            program.end_date = end;
        }
        if let Some(notes) = patch.notes {
            program.notes = Some(notes);
        }
        check_dates(program.start_date, program.end_date)?;

        self.save(&mut program).await?;
        info!(program = %program_id, revision = program.revision, "Updated program");
        Ok(program)
    }

    /// Delete a program together with its checkpoints and entries.
    pub async fn delete_program(&self, owner: &OwnerId, program_id: ProgramId) -> Result<()> {
        if !self.storage.delete_program(owner, program_id).await? {
            return Err(ProgramError::not_found("Program", program_id));
        }
        info!(program = %program_id, "Deleted program");
        Ok(())
    }

    /// Progress overview as of today.
    pub async fn program_overview(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
    ) -> Result<ProgramOverview> {
        let program = self.get_program(owner, program_id).await?;
        Ok(overview(&program, self.clock.today()))
    }

    // ---- checkpoints ----

    /// Discard the checkpoint set and rebuild it from the current start date.
    pub async fn regenerate_checkpoints(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
    ) -> Result<Vec<Checkpoint>> {
        let mut program = self.get_program(owner, program_id).await?;
        let checkpoints = generate_milestones(program.id, program.start_date)?;
        program.replace_checkpoints(checkpoints);

        self.save(&mut program).await?;
        info!(program = %program_id, start = %program.start_date, "Regenerated checkpoints");
        Ok(program.checkpoints)
    }

    /// Apply a partial update to one checkpoint.
    ///
    /// Fails with [`ProgramError::VersionConflict`] when `expected_version`
    /// is stale; nothing is written in that case.
    pub async fn update_checkpoint(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
        checkpoint_id: CheckpointId,
        patch: CheckpointPatch,
        expected_version: u64,
    ) -> Result<Checkpoint> {
        if let Some(weight) = patch.target_weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(ProgramError::InvalidRequest(format!(
                    "target_weight_kg must be a positive number, got {}",
                    weight
                )));
            }
        }
        if let Some(targets) = &patch.target_metrics {
            check_targets(targets)?;
        }

        let mut program = self.get_program(owner, program_id).await?;
        let checkpoint = program
            .checkpoint_mut(checkpoint_id)
            .ok_or_else(|| ProgramError::not_found("Checkpoint", checkpoint_id))?;

        if checkpoint.version != expected_version {
            return Err(ProgramError::VersionConflict {
                entity: "Checkpoint",
                expected: expected_version,
                actual: checkpoint.version,
            });
        }
        if !checkpoint.apply(patch) {
            debug!(checkpoint = %checkpoint_id, "Empty checkpoint patch, nothing to write");
            return Ok(checkpoint.clone());
        }
        let updated = checkpoint.clone();

        self.save(&mut program).await?;
        info!(
            checkpoint = %checkpoint_id,
            version = updated.version,
            status = %updated.status,
            "Updated checkpoint"
        );
        Ok(updated)
    }

    /// Evaluate a checkpoint against the snapshots logged before its date.
    pub async fn evaluate_checkpoint(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
        checkpoint_id: CheckpointId,
    ) -> Result<EvaluationResult> {
        let program = self.get_program(owner, program_id).await?;
        let checkpoint = program
            .checkpoint(checkpoint_id)
            .ok_or_else(|| ProgramError::not_found("Checkpoint", checkpoint_id))?;

        // window comes from the same read as the checkpoint
        let window = ProgressWindow::select(
            &program.progress_entries,
            checkpoint.checkpoint_date,
            self.config.evaluation_window,
        )
        .require_data()?;

        let result = build_report(checkpoint, &window);
        debug!(
            checkpoint = %checkpoint_id,
            entries = result.entries_analyzed,
            verdict = %result.verdict,
            "Evaluated checkpoint"
        );
        Ok(result)
    }

    // ---- progress entries ----

    /// Log a progress snapshot.
    pub async fn add_progress_entry(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
        request: NewProgressEntry,
    ) -> Result<ProgressEntry> {
        let mut program = self.get_program(owner, program_id).await?;
        let entry = request.into_entry(program.id, self.clock.today(), self.clock.now())?;
        program.push_entry(entry.clone());

        self.save(&mut program).await?;
        info!(program = %program_id, entry = %entry.id, date = %entry.date, "Logged progress entry");
        Ok(entry)
    }

    /// List snapshots. With both bounds: the inclusive range, oldest first.
    /// Otherwise every entry, newest first.
    pub async fn list_progress_entries(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ProgressEntry>> {
        let program = self.get_program(owner, program_id).await?;
        let mut entries = program.progress_entries;
        match (from, to) {
            (Some(from), Some(to)) => {
                entries.retain(|e| e.date >= from && e.date <= to);
                entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.created_at.cmp(&b.created_at)));
            }
            _ => {
                entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
            }
        }
        Ok(entries)
    }

    /// Remove one snapshot.
    pub async fn delete_progress_entry(
        &self,
        owner: &OwnerId,
        program_id: ProgramId,
        entry_id: ProgressEntryId,
    ) -> Result<()> {
        let mut program = self.get_program(owner, program_id).await?;
        if program.remove_entry(entry_id).is_none() {
            return Err(ProgramError::not_found("ProgressEntry", entry_id));
        }
        self.save(&mut program).await?;
        info!(program = %program_id, entry = %entry_id, "Deleted progress entry");
        Ok(())
    }

    /// Stamp and write the aggregate, adopting the new revision.
    async fn save(&self, program: &mut Program) -> Result<()> {
        program.updated_at = self.clock.now();
        program.revision = self.storage.update_program(program).await?;
        Ok(())
    }
}

/// Non-finite change targets would be persisted as `null` and silently
/// become untracked.
fn check_targets(targets: &TargetMetrics) -> Result<()> {
    let changes = [
        ("target_weight_change_kg", targets.target_weight_change_kg),
        ("target_waist_change_cm", targets.target_waist_change_cm),
    ];
    for (field, value) in changes {
        if let Some(v) = value.filter(|v| !v.is_finite()) {
            return Err(ProgramError::InvalidRequest(format!(
                "{} must be a finite number, got {}",
                field, v
            )));
        }
    }
    Ok(())
}

fn check_dates(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(ProgramError::InvalidRequest(format!(
            "end date {} precedes start date {}",
            end, start
        )));
    }
    Ok(())
}
