//! Conflict detection logic.
//!
//! Given a pull request's proposed changes and the current content of its
//! target branch, the detector finds changes that no longer apply cleanly
//! because the target branch moved after the proposer last read it.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::RequestError;
use crate::models::{BaseSnapshot, ChangeStatus, ProposedChange};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Categorisation of a conflict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// Both the PR and the target branch changed the file.
    EditEdit,
    /// The PR edited a file the target branch deleted.
    EditDelete,
    /// The PR deleted a file the target branch changed.
    DeleteEdit,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditEdit => write!(f, "edit-edit"),
            Self::EditDelete => write!(f, "edit-delete"),
            Self::DeleteEdit => write!(f, "delete-edit"),
        }
    }
}

/// A proposed change that cannot be applied cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// The file path where the conflict occurs.
    pub path: String,
    pub kind: ConflictKind,
    /// Content the PR wants to write, if any.
    #[serde(default, alias = "proposedContent", skip_serializing_if = "Option::is_none")]
    pub pr_content: Option<String>,
    /// Current content on the target branch, if the file exists there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_content: Option<String>,
    /// Content the proposer started from. Needed to draft a manual merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor_content: Option<String>,
    /// Human-readable explanation.
    pub message: String,
}

/// Outcome of one conflict check.
///
/// `has_conflicts` is derived from the conflict list on construction and on
/// deserialization, and is only exposed read-only, so the two never disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawConflictResult")]
pub struct ConflictResult {
    target_branch: String,
    checked_at: DateTime<Utc>,
    has_conflicts: bool,
    conflicts: Vec<Conflict>,
    /// Changed paths that could not be checked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<String>,
}

/// Stored form of [`ConflictResult`]; any `hasConflicts` in the input is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConflictResult {
    target_branch: String,
    checked_at: DateTime<Utc>,
    conflicts: Vec<Conflict>,
    #[serde(default)]
    skipped: Vec<String>,
}

impl From<RawConflictResult> for ConflictResult {
    fn from(raw: RawConflictResult) -> Self {
        Self {
            target_branch: raw.target_branch,
            checked_at: raw.checked_at,
            has_conflicts: !raw.conflicts.is_empty(),
            conflicts: raw.conflicts,
            skipped: raw.skipped,
        }
    }
}

impl ConflictResult {
    pub fn new(target_branch: impl Into<String>, conflicts: Vec<Conflict>) -> Self {
        Self {
            target_branch: target_branch.into(),
            checked_at: Utc::now(),
            has_conflicts: !conflicts.is_empty(),
            conflicts,
            skipped: Vec::new(),
        }
    }

    /// Record paths that were left out of the check.
    pub fn with_skipped(mut self, skipped: Vec<String>) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn has_conflicts(&self) -> bool {
        self.has_conflicts
    }

    /// Conflicts in the order their changes were proposed.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn into_conflicts(self) -> Vec<Conflict> {
        self.conflicts
    }

    /// Changed paths whose content could not be compared.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn target_branch(&self) -> &str {
        &self.target_branch
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// Find the conflict recorded for `path`.
    pub fn find(&self, path: &str) -> Option<&Conflict> {
        self.conflicts.iter().find(|c| c.path == path)
    }

    /// Read a previously saved result from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RequestError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Stateless conflict detector.
pub struct ConflictDetector;

impl ConflictDetector {
    /// Classify every proposed change against the target branch snapshot.
    ///
    /// Each change yields at most one conflict and output order follows
    /// input order. Duplicate paths are evaluated independently.
    /// `target_branch` only appears in messages.
    pub fn detect(
        changes: &[ProposedChange],
        base: &BaseSnapshot,
        target_branch: &str,
    ) -> ConflictResult {
        info!(
            change_count = changes.len(),
            base_files = base.len(),
            target_branch,
            "detecting conflicts"
        );

        let conflicts: Vec<Conflict> = changes
            .iter()
            .filter_map(|change| classify_change(change, base.get(&change.path), target_branch))
            .inspect(|conflict| {
                debug!(path = %conflict.path, kind = %conflict.kind, "conflict detected");
            })
            .collect();

        info!(count = conflicts.len(), "conflict detection complete");
        ConflictResult::new(target_branch, conflicts)
    }
}

/// Whether a modification still collides once the base has moved.
///
/// True when the base no longer matches what the proposer started from and
/// the proposer actually changed something. Absent values only equal other
/// absent values.
pub fn has_overlapping_changes(before: Option<&str>, after: Option<&str>, base: &str) -> bool {
    before != Some(base) && before != after
}

/// Decide whether a single change conflicts with the current content.
fn classify_change(
    change: &ProposedChange,
    current: Option<&str>,
    target_branch: &str,
) -> Option<Conflict> {
    let path = change.path.as_str();
    let before = change.before.as_deref();
    let after = change.after.as_deref();

    let (kind, message) = match (change.status, current) {
        // Edited here, gone there: the edit has nowhere to land.
        (ChangeStatus::Modified, None) => (
            ConflictKind::EditDelete,
            format!(
                "File \"{}\" was modified in this PR but deleted in {}",
                path, target_branch
            ),
        ),

        // Without a recorded `before` there is nothing to compare against.
        (ChangeStatus::Deleted, Some(cur)) if before.is_some_and(|b| b != cur) => (
            ConflictKind::DeleteEdit,
            format!(
                "File \"{}\" was deleted in this PR but modified in {}",
                path, target_branch
            ),
        ),

        (ChangeStatus::Modified, Some(cur))
            if before != Some(cur) && has_overlapping_changes(before, after, cur) =>
        {
            (
                ConflictKind::EditEdit,
                format!(
                    "File \"{}\" was modified in both this PR and {}",
                    path, target_branch
                ),
            )
        }

        // Added files never conflict, nor do clean edits and deletes.
        _ => return None,
    };

    Some(Conflict {
        path: change.path.clone(),
        kind,
        pr_content: change.after.clone(),
        base_content: current.map(str::to_string),
        ancestor_content: change.before.clone(),
        message,
    })
}
