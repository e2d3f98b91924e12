//! Error types and load result structures for rule sources.

use std::path::PathBuf;

/// Errors that can occur while loading rule configuration.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse/deserialization error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Rule validation error; the message enumerates every offending entry.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The options monitor was built from in-memory options and has no file to re-read.
    #[error("options monitor has no backing file")]
    Unbacked,

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single rule file.
#[derive(Debug)]
pub struct LoadResult {
    /// Configured path, resolved against the content root.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// File parsed and validated.
    Loaded { rule_count: usize },
    /// File was skipped (missing, blank path).
    Skipped { reason: String },
    /// Parse or validation error occurred; the file contributes nothing.
    Failed { error: String },
}
