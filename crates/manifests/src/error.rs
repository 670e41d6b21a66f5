//! Error types for manifest generation.

use thiserror::Error;

/// Errors raised while building or writing manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Invalid application spec: {field}: {reason}")]
    InvalidSpec { field: String, reason: String },

    #[error("Unknown runtime: '{runtime}'")]
    UnknownRuntime { runtime: String },

    #[error("Unknown CI platform: '{platform}'")]
    UnknownPlatform { platform: String },

    #[error("Template '{name}' is invalid: {reason}")]
    Template { name: String, reason: String },

    #[error("Failed to render template '{name}': {reason}")]
    Render { name: String, reason: String },

    #[error("Failed to write '{path}': {reason}")]
    Write { path: String, reason: String },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ManifestError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;
