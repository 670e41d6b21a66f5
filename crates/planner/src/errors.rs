//! Error types for the planner crate.

use thiserror::Error;

/// Error types for planning and task management
#[derive(Error, Debug)]
pub enum PlannerError {
    // Task errors
    #[error("Task '{task_id}' not found")]
    TaskNotFound { task_id: String },

    #[error("Invalid status transition for task '{task_id}': {from} -> {to}")]
    InvalidTransition {
        task_id: String,
        from: String,
        to: String,
    },

    #[error("Task '{task_id}' is {status}; reopen it before recording progress")]
    TaskClosed { task_id: String, status: String },

    #[error("Invalid status: '{status}'")]
    InvalidStatus { status: String },

    #[error("Invalid priority: '{priority}'")]
    InvalidPriority { priority: String },

    #[error("Invalid complexity: '{complexity}'")]
    InvalidComplexity { complexity: String },

    #[error("Invalid progress {value}: must be between 0 and 100")]
    InvalidProgress { value: u32 },

    #[error("Invalid task ID format: '{id}'")]
    InvalidId { id: String },

    // Dependency errors
    #[error("Circular dependency detected: {cycle:?}")]
    CircularDependency { cycle: Vec<String> },

    #[error("Invalid dependency: task '{task_id}' depends on non-existent task '{dep_id}'")]
    InvalidDependency { task_id: String, dep_id: String },

    #[error("Task '{task_id}' cannot depend on itself")]
    SelfDependency { task_id: String },

    // Plan errors
    #[error("Plan '{plan_id}' not found")]
    PlanNotFound { plan_id: String },

    #[error("Unknown project type: '{project_type}'")]
    InvalidProjectType { project_type: String },

    #[error("Plan '{plan_id}' already has {count} task(s)")]
    PlanAlreadyMaterialized { plan_id: String, count: usize },

    // Storage errors
    #[error("Storage error: {reason}")]
    StorageError { reason: String },

    #[error("Failed to read file '{path}': {reason}")]
    FileReadError { path: String, reason: String },

    #[error("Failed to write file '{path}': {reason}")]
    FileWriteError { path: String, reason: String },

    #[error("Failed to parse JSON: {reason}")]
    JsonParseError { reason: String },

    #[error("Project not initialized. Run 'upm init' first.")]
    NotInitialized,

    // Configuration errors
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidConfigValue { key: String, reason: String },

    // Manifest errors
    #[error(transparent)]
    Manifest(#[from] manifests::ManifestError),

    // General errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseError {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlannerError::TaskNotFound {
            task_id: "123".to_string(),
        };
        assert_eq!(err.to_string(), "Task '123' not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::StorageError { .. }));
    }

    #[test]
    fn test_manifest_error_is_transparent() {
        let err: PlannerError = manifests::ManifestError::UnknownRuntime {
            runtime: "cobol".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Unknown runtime: 'cobol'");
    }
}
