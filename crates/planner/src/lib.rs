#![warn(clippy::pedantic)]
// Allow common pedantic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::map_unwrap_or)]

//! # Planner
//!
//! Project planning and task management for the `upm` command line tool.
//!
//! This crate provides:
//! - Task management with dependencies, progress and custom criteria
//! - Weighted priority scoring with configurable weights
//! - Phased project plans generated from per-project-type templates
//! - File-based storage in the `.upm/` directory
//! - Status reports and Markdown/JSON export
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use planner::{FileStorage, NewTask, TasksDomain};
//!
//! let storage = Arc::new(FileStorage::new("."));
//! let domain = TasksDomain::new(storage);
//!
//! let task = domain.add_task(NewTask::new("Write docs")).await?;
//! ```

// Core entities
pub mod entities;

// Error types
pub mod errors;

// Storage layer
pub mod storage;

// Domain facades
pub mod domain;

// Terminal UI helpers
pub mod ui;

// Re-export key types for convenience
pub use domain::{
    ConfigDomain, DependencyDomain, ExportFormat, NewTask, PlansDomain, PrioritizeDomain,
    ProjectReport, TaskFilter, TaskUpdate, TasksDomain,
};
pub use entities::{Plan, PlannerConfig, ProjectType, Task, TaskPriority, TaskStatus};
pub use errors::{PlannerError, PlannerResult};
pub use storage::{FileStorage, Storage};
