//! Git access for building conflict-check inputs.

pub mod client;

pub use client::{BranchSnapshot, ChangeSet, GitClient};
