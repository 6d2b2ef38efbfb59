//! Three-way merge drafts for manual resolution.
//!
//! Uses the `diffy` crate to merge the proposer's starting point (ancestor),
//! the pull request's version, and the target branch's current version.
//! The output is only a starting point for a human; nothing here is applied
//! automatically.

use tracing::{debug, info};

use super::detector::Conflict;
use crate::errors::ConflictError;

/// The result of a three-way merge attempt.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The merged content (contains conflict markers if `has_conflicts`).
    pub merged_content: String,
    pub has_conflicts: bool,
    pub conflict_markers: Vec<ConflictMarker>,
}

/// A single conflict region within merged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictMarker {
    /// Line of the `<<<<<<<` marker (1-indexed).
    pub start_line: usize,
    /// Line of the `>>>>>>>` marker (1-indexed).
    pub end_line: usize,
}

/// Stateless three-way merge engine.
pub struct Merger;

impl Merger {
    /// Merge `pr` and `base`, both descended from `ancestor`.
    ///
    /// Conflicting regions are wrapped in `<<<<<<< pr` / `=======` /
    /// `>>>>>>> <target_branch>` markers, two-sided only: the ancestor's
    /// lines are not repeated inside the region.
    pub fn three_way_merge(ancestor: &str, pr: &str, base: &str, target_branch: &str) -> MergeResult {
        info!(target_branch, "performing three-way merge");

        if pr == ancestor || pr == base {
            debug!("pr side adds nothing, base wins cleanly");
            return clean(base);
        }
        if base == ancestor {
            debug!("base unchanged, pr wins cleanly");
            return clean(pr);
        }

        let mut options = diffy::MergeOptions::new();
        options.set_conflict_style(diffy::ConflictStyle::Merge);
        match options.merge(ancestor, pr, base) {
            Ok(merged) => {
                debug!("clean merge");
                clean(&merged)
            }
            Err(conflicted) => {
                let merged_content = relabel(&conflicted, target_branch);
                let conflict_markers = find_markers(&merged_content);
                debug!(regions = conflict_markers.len(), "merge has conflicts");
                MergeResult {
                    merged_content,
                    has_conflicts: true,
                    conflict_markers,
                }
            }
        }
    }

    /// Draft a merge for a detected conflict.
    ///
    /// Only edit/edit conflicts carry all three versions; the other kinds
    /// have a missing side and are rejected.
    pub fn draft_for(conflict: &Conflict, target_branch: &str) -> Result<MergeResult, ConflictError> {
        let missing = |what: &str| ConflictError::MergeFailed {
            path: conflict.path.clone(),
            detail: format!("{} content is not available", what),
        };

        let ancestor = conflict.ancestor_content.as_deref().ok_or_else(|| missing("ancestor"))?;
        let pr = conflict.pr_content.as_deref().ok_or_else(|| missing("pull request"))?;
        let base = conflict.base_content.as_deref().ok_or_else(|| missing("base"))?;

        Ok(Self::three_way_merge(ancestor, pr, base, target_branch))
    }
}

fn clean(content: &str) -> MergeResult {
    MergeResult {
        merged_content: content.to_string(),
        has_conflicts: false,
        conflict_markers: Vec::new(),
    }
}

/// Replace diffy's `ours`/`theirs` labels with the sides' real names.
fn relabel(conflicted: &str, target_branch: &str) -> String {
    conflicted
        .split_inclusive('\n')
        .map(|line| {
            if line.starts_with("<<<<<<< ours") {
                line.replacen("ours", "pr", 1)
            } else if line.starts_with(">>>>>>> theirs") {
                line.replacen("theirs", target_branch, 1)
            } else {
                line.to_string()
            }
        })
        .collect()
}

fn find_markers(content: &str) -> Vec<ConflictMarker> {
    let mut markers = Vec::new();
    let mut open = None;
    for (idx, line) in content.lines().enumerate() {
        if line.starts_with("<<<<<<<") {
            open = Some(idx + 1);
        } else if line.starts_with(">>>>>>>") {
            if let Some(start_line) = open.take() {
                markers.push(ConflictMarker {
                    start_line,
                    end_line: idx + 1,
                });
            }
        }
    }
    markers
}
