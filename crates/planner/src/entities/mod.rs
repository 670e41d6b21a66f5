//! Core data structures for planning and task management.

mod config;
mod plan;
mod task;

pub use config::{
    ComplexityWeights, GlobalConfig, ManifestDefaults, PlannerConfig, PriorityWeights,
    ScoringConfig, UrgencyConfig, UrgencyTier,
};
pub use plan::{Phase, Plan, ProjectType, Risk, RiskLevel, Timeline};
pub use task::{Task, TaskComplexity, TaskPriority, TaskStatus};
