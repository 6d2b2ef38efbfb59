//! gittr core library.
//!
//! This crate checks whether a pull request's proposed file changes still
//! apply to its target branch: the data model, conflict detection and
//! resolution, merge drafts, configuration, and reading check inputs from a
//! local Git repository.

pub mod config;
pub mod conflict;
pub mod errors;
pub mod git;
pub mod models;
pub mod pr_check;

// Re-exports for convenience.
pub use config::AppConfig;
pub use conflict::{Conflict, ConflictDetector, ConflictKind, ConflictResult};
pub use git::GitClient;
pub use models::{BaseSnapshot, ChangeStatus, ConflictCheckRequest, ProposedChange};
pub use pr_check::PrCheck;
