//! Entry points that run a full conflict check.
//!
//! A check either arrives pre-assembled as a [`ConflictCheckRequest`] (the
//! web frontend's stored PR files plus fetched branch content) or is built
//! from two branches of a local repository.

use tracing::{info, warn};

use crate::config::SnapshotConfig;
use crate::conflict::{ConflictDetector, ConflictResult};
use crate::errors::GitError;
use crate::git::GitClient;
use crate::models::{ChangeStatus, ConflictCheckRequest};

pub struct PrCheck;

impl PrCheck {
    /// Check a pre-assembled request.
    pub fn from_request(request: &ConflictCheckRequest) -> ConflictResult {
        ConflictDetector::detect(&request.changes, &request.base, &request.target_branch)
    }

    /// Check what merging `source` into `target` would run into.
    ///
    /// Paths whose content could not be read as text are reported in
    /// [`ConflictResult::skipped`] instead of being compared. A change with
    /// an unreadable source side is still checked when the target no longer
    /// has the file, since an edit there is an edit/delete conflict whatever
    /// the content.
    pub fn from_repository(
        client: &GitClient,
        source: &str,
        target: &str,
        config: &SnapshotConfig,
    ) -> Result<ConflictResult, GitError> {
        info!(source, target, "checking branch for conflicts");

        let mut set = client.proposed_changes(source, target, config)?;
        let paths: Vec<String> = set.changes.iter().map(|c| c.path.clone()).collect();
        let snapshot = client.snapshot_branch(target, Some(&paths), config)?;

        let mut unchecked = Vec::new();
        set.changes.retain(|change| {
            let keep = match change.status {
                // Additions never conflict, whatever either side holds.
                ChangeStatus::Added => true,
                _ if snapshot.skipped.contains(&change.path) => false,
                _ if set.skipped.contains(&change.path) => !snapshot.files.contains(&change.path),
                _ => true,
            };
            if !keep {
                warn!(path = %change.path, "not checked: content unavailable as text");
                unchecked.push(change.path.clone());
            }
            keep
        });

        Ok(ConflictDetector::detect(&set.changes, &snapshot.files, target).with_skipped(unchecked))
    }
}
