//! Domain facades for planning and task management.
//!
//! These facades provide high-level operations that combine
//! storage operations with business logic.

mod config;
mod deps;
pub mod export;
mod plans;
mod prioritize;
pub mod reports;
pub mod scoring;
mod tasks;
pub mod templates;

pub use config::ConfigDomain;
pub use deps::{validate_tasks, DependencyDomain, InvalidDep, ValidationResult};
pub use export::ExportFormat;
pub use plans::PlansDomain;
pub use prioritize::{PrioritizeDomain, PrioritizeResult};
pub use reports::ProjectReport;
pub use scoring::{bucket_for_score, rank_tasks, score_task, RankedTask, ScoreBreakdown, ScoringContext};
pub use tasks::{NewTask, TaskFilter, TaskUpdate, TasksDomain};
