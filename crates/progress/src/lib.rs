//! Progress Tracking (Layer 3)
//!
//! Milestone generation, checkpoint evaluation, and the program service that
//! ties them to storage.
//!
//! ```text
//! entries -> window -> aggregate -> scorer -> report
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod clock;
pub mod milestones;
pub mod window;
pub mod aggregate;
pub mod scorer;
pub mod report;
pub mod tracker;
pub mod service;

pub use error::{ErrorKind, ProgramError, Result};
pub use clock::{Clock, FixedClock, SystemClock};
pub use milestones::{generate_milestones, MilestoneTemplate, Offset, MILESTONES};
pub use window::{ProgressWindow, EVALUATION_WINDOW};
pub use aggregate::{round2, ObservedMetrics};
pub use scorer::Scorecard;
pub use report::build_report;
pub use tracker::{overview, ProgramOverview};
pub use service::{ProgramService, ProgramServiceConfig};
