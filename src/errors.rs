use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during agent linting.
///
/// Only whole-run failures live here. Anything recoverable at the level of a
/// single resource or rule is reported as a [`crate::diagnostics::Diagnostic`]
/// instead, so that one defect never aborts the run.
#[derive(Error, Debug)]
pub enum LintError {
    /// The agent export root is missing or unreadable.
    #[error("agent export not found at {path}")]
    AgentNotFound { path: PathBuf },

    /// A required top-level resource collection is absent.
    #[error("required collection '{collection}' missing from agent export")]
    MissingCollection { collection: &'static str },

    /// The rc configuration file could not be parsed.
    #[error("config error: {message}")]
    Config { message: String },

    /// A naming-convention pattern in the config is not a valid regex.
    #[error("invalid naming pattern for '{subtype}': {source}")]
    InvalidPattern {
        subtype: String,
        source: regex::Error,
    },

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error on a record the run cannot proceed without.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error in the rc config file.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Convenience alias for `Result<T, LintError>`.
pub type Result<T> = std::result::Result<T, LintError>;
