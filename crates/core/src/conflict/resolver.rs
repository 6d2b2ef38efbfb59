//! Conflict resolution actions.
//!
//! The [`ConflictResolver`] picks the content a conflict should settle on and
//! writes that choice back into the pull request's change set. It never
//! merges; see [`Merger`](super::Merger) for drafting a manual merge.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::detector::Conflict;
use crate::errors::ConflictError;
use crate::models::{ChangeStatus, ProposedChange};

/// Named resolution strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Keep the pull request's version.
    Pr,
    /// Keep the target branch's version.
    Base,
    /// Content will be supplied by hand.
    Manual,
}

impl FromStr for Resolution {
    type Err = ConflictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pr" => Ok(Self::Pr),
            "base" => Ok(Self::Base),
            "manual" => Ok(Self::Manual),
            other => Err(ConflictError::UnknownResolution(other.to_string())),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pr => write!(f, "pr"),
            Self::Base => write!(f, "base"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Content chosen for a conflict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolved {
    /// `None` means the file should not exist, or for manual resolutions,
    /// that nothing was chosen yet.
    pub content: Option<String>,
    pub resolved: bool,
}

/// Stateless conflict resolution operations.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Pick the content for `conflict` according to `resolution`.
    pub fn resolve(conflict: &Conflict, resolution: Resolution) -> Resolved {
        debug!(path = %conflict.path, %resolution, "resolving conflict");
        match resolution {
            Resolution::Pr => Resolved {
                content: conflict.pr_content.clone(),
                resolved: true,
            },
            Resolution::Base => Resolved {
                content: conflict.base_content.clone(),
                resolved: true,
            },
            Resolution::Manual => Resolved {
                content: None,
                resolved: false,
            },
        }
    }

    /// Write a resolved outcome back into the change set.
    ///
    /// Every change for `path` now starts from `base_content` and ends at the
    /// resolved content, so a re-check against the same base is clean.
    pub fn apply(
        changes: &mut [ProposedChange],
        conflict: &Conflict,
        resolved: &Resolved,
    ) -> Result<(), ConflictError> {
        if !resolved.resolved {
            return Err(ConflictError::Unresolved(conflict.path.clone()));
        }

        let mut matched = 0usize;
        for change in changes.iter_mut().filter(|c| c.path == conflict.path) {
            change.before = conflict.base_content.clone();
            change.after = resolved.content.clone();
            change.status = match (&change.before, &change.after) {
                (_, None) => ChangeStatus::Deleted,
                (None, Some(_)) => ChangeStatus::Added,
                (Some(_), Some(_)) => ChangeStatus::Modified,
            };
            matched += 1;
        }

        if matched == 0 {
            return Err(ConflictError::PathNotInChangeSet(conflict.path.clone()));
        }

        info!(path = %conflict.path, matched, "resolution applied to change set");
        Ok(())
    }
}
