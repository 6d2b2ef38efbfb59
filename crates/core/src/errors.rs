//! Error types for the gittr core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type. Conflict detection itself is infallible and has no entry here.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from local Git (git2) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The repository path does not exist or is not a git repo.
    #[error("git repository not found at '{0}'")]
    RepositoryNotFound(String),

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git2Error(#[from] git2::Error),

    /// A branch or revision could not be resolved.
    #[error("git ref not found: {0}")]
    RefNotFound(String),

    /// The two branches share no history.
    #[error("no merge base between '{source_branch}' and '{target}'")]
    NoMergeBase { source_branch: String, target: String },

    /// A blob is not valid UTF-8 and cannot take part in a text comparison.
    #[error("file '{0}' is not valid UTF-8")]
    NotText(String),
}

// ---------------------------------------------------------------------------
// Conflict errors
// ---------------------------------------------------------------------------

/// Errors from conflict resolution and merge drafting.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// The resolution keyword is not one of `pr`, `base`, `manual`.
    #[error("unknown resolution '{0}': expected 'pr', 'base' or 'manual'")]
    UnknownResolution(String),

    /// No proposed change exists for the path being resolved.
    #[error("no proposed change for path '{0}'")]
    PathNotInChangeSet(String),

    /// Attempted to write back a resolution that was not resolved.
    #[error("conflict on '{0}' is not resolved")]
    Unresolved(String),

    /// A merge draft could not be produced.
    #[error("cannot draft a merge for '{path}': {detail}")]
    MergeFailed { path: String, detail: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Request errors
// ---------------------------------------------------------------------------

/// Errors reading check requests and stored results.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The JSON document does not match the expected shape.
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Generic I/O error reading the request file.
    #[error("request I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
