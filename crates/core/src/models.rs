//! Shared data models used across the gittr core.
//!
//! These types describe a pull request's proposed file changes and the
//! target branch state they are checked against. Field names serialize in
//! camelCase so the JSON matches what the gittr web frontend stores.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::RequestError;

// ---------------------------------------------------------------------------
// Proposed changes
// ---------------------------------------------------------------------------

/// What a pull request does to a single file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// A file-level mutation proposed by a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProposedChange {
    /// Repository-relative file path.
    pub path: String,
    pub status: ChangeStatus,
    /// Content the proposer saw when the PR was created. Absent for `added`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// New content. Absent for `deleted`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl ProposedChange {
    pub fn added(path: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: ChangeStatus::Added,
            before: None,
            after: Some(after.into()),
        }
    }

    pub fn modified(
        path: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            status: ChangeStatus::Modified,
            before: Some(before.into()),
            after: Some(after.into()),
        }
    }

    pub fn deleted(path: impl Into<String>, before: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: ChangeStatus::Deleted,
            before: Some(before.into()),
            after: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Base snapshot
// ---------------------------------------------------------------------------

/// Current content of the target branch, keyed by path.
///
/// A missing key means the file does not exist on the target branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct BaseSnapshot {
    files: BTreeMap<String, String>,
}

impl BaseSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl<P: Into<String>, C: Into<String>> FromIterator<(P, C)> for BaseSnapshot {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(p, c)| (p.into(), c.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Check request
// ---------------------------------------------------------------------------

/// A self-contained conflict check, as exchanged with the web frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckRequest {
    pub target_branch: String,
    pub changes: Vec<ProposedChange>,
    #[serde(default)]
    pub base: BaseSnapshot,
}

impl ConflictCheckRequest {
    /// Read a request from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RequestError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let json = r#"{
            "targetBranch": "main",
            "changes": [
                {"path": "a.txt", "status": "modified", "before": "v1", "after": "v2"},
                {"path": "b.txt", "status": "added", "after": "new"},
                {"path": "c.txt", "status": "deleted", "before": "old"}
            ],
            "base": {"a.txt": "v1-changed", "c.txt": "old"}
        }"#;
        let req = ConflictCheckRequest::from_json(json).unwrap();
        assert_eq!(req.target_branch, "main");
        assert_eq!(req.changes.len(), 3);
        assert_eq!(req.changes[1].status, ChangeStatus::Added);
        assert_eq!(req.changes[1].before, None);
        assert_eq!(req.changes[2].after, None);
        assert_eq!(req.base.get("a.txt"), Some("v1-changed"));
        assert!(!req.base.contains("b.txt"));
    }

    #[test]
    fn test_missing_base_defaults_to_empty() {
        let json = r#"{"targetBranch": "main", "changes": []}"#;
        let req = ConflictCheckRequest::from_json(json).unwrap();
        assert!(req.base.is_empty());
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        let json = r#"{"targetBranch": "main", "changes": [{"path": "a", "status": "renamed"}]}"#;
        let result = ConflictCheckRequest::from_json(json);
        assert!(matches!(result, Err(RequestError::Malformed(_))));
    }

    #[test]
    fn test_absent_fields_not_serialized() {
        let json = serde_json::to_string(&ProposedChange::deleted("x", "old")).unwrap();
        assert_eq!(json, r#"{"path":"x","status":"deleted","before":"old"}"#);
    }
}
