//! Optivita CLI - transformation programs, checkpoints and progress.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use optivita_core::{
    Checkpoint, CheckpointId, CheckpointPatch, CheckpointPhase, CheckpointStatus, EvaluationResult,
    FocusTag, NewProgram, NewProgressEntry, OwnerId, Program, ProgramId, ProgramPatch,
    ProgressEntry, ProgressEntryId, TargetMetrics,
};
use optivita_progress::{Clock, ProgramOverview, ProgramService, SystemClock};
use optivita_storage::{JsonStorage, Storage};

#[derive(Parser)]
#[command(name = "optivita")]
#[command(about = "Physical transformation programs with milestone checkpoints", long_about = None)]
struct Cli {
    /// Data directory (or `sqlite:` URL when built with the sqlite feature)
    #[arg(long, global = true, default_value = ".optivita")]
    storage: String,

    /// Owner the commands act for
    #[arg(long, global = true, default_value = "local")]
    owner: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a program with the standard checkpoints
    Create {
        /// Start date (YYYY-MM-DD)
        start: NaiveDate,
        /// End date; defaults to 12 months after start
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List programs
    List,
    /// Show a program with its checkpoints
    Show {
        /// Program ID
        program: ProgramId,
    },
    /// Edit program dates or notes (checkpoints are not moved)
    Update {
        /// Program ID
        program: ProgramId,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
        /// Revision the edit is based on
        #[arg(long)]
        revision: Option<u64>,
    },
    /// Delete a program and everything logged against it
    Delete {
        /// Program ID
        program: ProgramId,
    },
    /// Rebuild checkpoints from the current start date
    Regenerate {
        /// Program ID
        program: ProgramId,
    },
    /// Update a checkpoint
    Checkpoint {
        /// Program ID
        program: ProgramId,
        /// Checkpoint ID
        checkpoint: CheckpointId,
        /// Version the update is based on
        #[arg(long = "expect-version")]
        version: u64,
        #[arg(long)]
        status: Option<CheckpointStatus>,
        #[arg(long)]
        phase: Option<CheckpointPhase>,
        /// Comma-separated focus tags
        #[arg(long, value_delimiter = ',')]
        focus: Option<Vec<FocusTag>>,
        #[arg(long)]
        notes: Option<String>,
        /// Absolute target weight (kg)
        #[arg(long)]
        target_weight: Option<f64>,
        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Log a progress snapshot
    Log {
        /// Program ID
        program: ProgramId,
        /// Snapshot date; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        waist: Option<f64>,
        #[arg(long)]
        steps: Option<u32>,
        #[arg(long)]
        workouts: Option<u32>,
        /// Diet compliance (0-100)
        #[arg(long)]
        diet: Option<u8>,
        #[arg(long)]
        notes: Option<String>,
        /// Photo reference; repeatable
        #[arg(long = "photo")]
        photos: Vec<String>,
    },
    /// List progress snapshots
    Entries {
        /// Program ID
        program: ProgramId,
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Delete a progress snapshot
    RemoveEntry {
        /// Program ID
        program: ProgramId,
        /// Entry ID
        entry: ProgressEntryId,
    },
    /// Evaluate a checkpoint against recent progress
    Evaluate {
        /// Program ID
        program: ProgramId,
        /// Checkpoint ID
        checkpoint: CheckpointId,
    },
    /// Checkpoint progress overview
    Overview {
        /// Program ID
        program: ProgramId,
    },
}

/// Replacement target schema for a checkpoint. Any flag replaces the whole
/// schema; metrics left out become untracked.
#[derive(clap::Args)]
struct TargetArgs {
    #[arg(long)]
    weight_change: Option<f64>,
    #[arg(long)]
    waist_change: Option<f64>,
    #[arg(long)]
    training_days: Option<u32>,
    #[arg(long)]
    steps: Option<u32>,
    #[arg(long)]
    diet: Option<u32>,
}

impl TargetArgs {
    fn into_targets(self) -> Option<TargetMetrics> {
        let targets = TargetMetrics {
            target_weight_change_kg: self.weight_change,
            target_waist_change_cm: self.waist_change,
            training_days_per_week: self.training_days,
            steps_average: self.steps,
            diet_compliance_target: self.diet,
        };
        (!targets.is_empty()).then_some(targets)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let storage = open_storage(&cli.storage).await?;
    let service = ProgramService::new(storage);
    let owner = OwnerId::new(cli.owner);
    let json = cli.json;

    match cli.command {
        Commands::Create { start, end, notes } => {
            let request = NewProgram { start_date: start, end_date: end, notes };
            let program = service.create_program(&owner, request).await?;
            emit(json, &program, print_program)?;
        }
        Commands::List => {
            let programs = service.list_programs(&owner).await?;
            emit(json, &programs, |programs| {
                println!("Programs ({})", programs.len());
                for p in programs {
                    println!(
                        "  {} | {} -> {} | {} checkpoints, {} entries",
                        p.id,
                        p.start_date,
                        p.end_date,
                        p.checkpoints.len(),
                        p.progress_entries.len()
                    );
                }
            })?;
        }
        Commands::Show { program } => {
            let program = service.get_program(&owner, program).await?;
            emit(json, &program, print_program)?;
        }
        Commands::Update { program, start, end, notes, revision } => {
            let patch = ProgramPatch { start_date: start, end_date: end, notes };
            let program = service.update_program(&owner, program, patch, revision).await?;
            emit(json, &program, print_program)?;
        }
        Commands::Delete { program } => {
            service.delete_program(&owner, program).await?;
            println!("Deleted program {}", program);
        }
        Commands::Regenerate { program } => {
            let checkpoints = service.regenerate_checkpoints(&owner, program).await?;
            emit(json, &checkpoints, |checkpoints| {
                for c in checkpoints {
                    print_checkpoint(c);
                }
            })?;
        }
        Commands::Checkpoint {
            program,
            checkpoint,
            version,
            status,
            phase,
            focus,
            notes,
            target_weight,
            targets,
        } => {
            let patch = CheckpointPatch {
                phase,
                focus_tags: focus,
                target_metrics: targets.into_targets(),
                target_weight_kg: target_weight,
                notes,
                status,
            };
            let checkpoint = service
                .update_checkpoint(&owner, program, checkpoint, patch, version)
                .await?;
            emit(json, &checkpoint, print_checkpoint)?;
        }
        Commands::Log {
            program,
            date,
            weight,
            waist,
            steps,
            workouts,
            diet,
            notes,
            photos,
        } => {
            let request = NewProgressEntry {
                date: Some(date.unwrap_or_else(|| SystemClock.today())),
                weight_kg: weight,
                waist_cm: waist,
                steps_avg: steps,
                workouts_completed: workouts,
                diet_compliance_score: diet,
                notes,
                photos,
            };
            let entry = service.add_progress_entry(&owner, program, request).await?;
            emit(json, &entry, |e| println!("Logged entry {} for {}", e.id, e.date))?;
        }
        Commands::Entries { program, from, to } => {
            let entries = service.list_progress_entries(&owner, program, from, to).await?;
            emit(json, &entries, |entries| {
                println!("Entries ({})", entries.len());
                for e in entries {
                    print_entry(e);
                }
            })?;
        }
        Commands::RemoveEntry { program, entry } => {
            service.delete_progress_entry(&owner, program, entry).await?;
            println!("Deleted entry {}", entry);
        }
        Commands::Evaluate { program, checkpoint } => {
            let result = service.evaluate_checkpoint(&owner, program, checkpoint).await?;
            emit(json, &result, print_evaluation)?;
        }
        Commands::Overview { program } => {
            let overview = service.program_overview(&owner, program).await?;
            emit(json, &overview, print_overview)?;
        }
    }

    Ok(())
}

async fn open_storage(location: &str) -> Result<Arc<dyn Storage>> {
    if location.starts_with("sqlite:") {
        return open_sqlite(location).await;
    }

    let root = PathBuf::from(location);
    debug!("Opening JSON storage at {}", root.display());
    Ok(Arc::new(JsonStorage::new(&root).await?))
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(url: &str) -> Result<Arc<dyn Storage>> {
    debug!("Opening SQLite storage at {}", url);
    Ok(Arc::new(optivita_storage::SqliteStorage::new(url).await?))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(url: &str) -> Result<Arc<dyn Storage>> {
    anyhow::bail!("{} needs a build with the `sqlite` feature", url)
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

fn print_program(program: &Program) {
    println!("Program: {}", program.id);
    println!("  Dates: {} -> {}", program.start_date, program.end_date);
    if let Some(notes) = &program.notes {
        println!("  Notes: {}", notes);
    }
    println!("  Revision: {}", program.revision);
    println!("  Entries: {}", program.progress_entries.len());
    println!("  Checkpoints:");
    for c in &program.checkpoints {
        print_checkpoint(c);
    }
}

fn print_checkpoint(c: &Checkpoint) {
    let tags: Vec<&str> = c.focus_tags.iter().map(|t| t.as_str()).collect();
    println!(
        "    {} | {} | {} | {} | v{} - {} [{}]",
        c.id,
        c.checkpoint_date,
        c.phase,
        c.status,
        c.version,
        c.title,
        tags.join(", ")
    );
}

fn print_entry(e: &ProgressEntry) {
    let mut fields = Vec::new();
    if let Some(w) = e.weight_kg {
        fields.push(format!("weight {:.1} kg", w));
    }
    if let Some(w) = e.waist_cm {
        fields.push(format!("waist {:.1} cm", w));
    }
    if let Some(s) = e.steps_avg {
        fields.push(format!("{} steps", s));
    }
    if let Some(n) = e.workouts_completed {
        fields.push(format!("{} workouts", n));
    }
    if let Some(d) = e.diet_compliance_score {
        fields.push(format!("diet {}%", d));
    }
    println!("  {} | {} | {}", e.id, e.date, fields.join(", "));
}

fn print_evaluation(result: &EvaluationResult) {
    println!("{} ({})", result.checkpoint_title, result.checkpoint_date);
    println!("  Verdict: {}", result.verdict);
    println!("  {}", result.summary);
    println!("  Entries analyzed: {}", result.entries_analyzed);
    for outcome in &result.outcomes {
        let mark = match (outcome.met, outcome.significantly_ahead) {
            (true, true) => "ahead",
            (true, false) => "met",
            _ => "missed",
        };
        println!(
            "  {:<16} {:>10} / {:<10} {}",
            outcome.metric.label(),
            outcome.observed,
            outcome.target,
            mark
        );
    }
}

fn print_overview(overview: &ProgramOverview) {
    println!(
        "Checkpoints: {}/{} achieved ({}%)",
        overview.achieved_checkpoints, overview.total_checkpoints, overview.percentage
    );
    match (&overview.next_checkpoint, overview.days_to_next) {
        (Some(next), Some(days)) => {
            println!("Next: {} on {} (in {} days)", next.title, next.checkpoint_date, days)
        }
        _ => println!("No upcoming checkpoints"),
    }
}
