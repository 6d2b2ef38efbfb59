//! Local Git repository reads via `git2`.
//!
//! Builds the two inputs of a conflict check from real branches: the change
//! set a source branch proposes, and the current content of the target.

use std::path::{Path, PathBuf};

use git2::{Commit, Delta, ErrorCode, FileMode, ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};
use tracing::{debug, info, instrument, warn};

use crate::config::SnapshotConfig;
use crate::errors::GitError;
use crate::models::{BaseSnapshot, ChangeStatus, ProposedChange};

/// High-level Git client wrapping a `git2::Repository`.
pub struct GitClient {
    repo: Repository,
    repo_path: PathBuf,
}

/// Target branch content plus the paths that exist but were not read.
#[derive(Debug, Clone, Default)]
pub struct BranchSnapshot {
    pub files: BaseSnapshot,
    /// Present on the branch but too large, binary, or not UTF-8.
    pub skipped: Vec<String>,
}

/// Changes a source branch proposes, plus the paths left out.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub changes: Vec<ProposedChange>,
    /// Changed, but one side could not be read as text. The matching
    /// entry in `changes` has that side set to `None`.
    pub skipped: Vec<String>,
}

/// Outcome of reading one blob as text.
enum BlobText {
    Text(String),
    Skipped,
}

impl GitClient {
    /// Open an existing Git repository at `repo_path`.
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Result<Self, GitError> {
        let path = repo_path.as_ref();
        info!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path)
            .map_err(|_| GitError::RepositoryNotFound(path.display().to_string()))?;
        Ok(Self {
            repo,
            repo_path: path.to_path_buf(),
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Resolve a branch name (or any revision) to its tip commit.
    pub fn resolve_branch(&self, name: &str) -> Result<Commit<'_>, GitError> {
        let object = self.repo.revparse_single(name).map_err(|e| match e.code() {
            ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous => {
                GitError::RefNotFound(name.to_string())
            }
            _ => GitError::Git2Error(e),
        })?;
        Ok(object.peel_to_commit()?)
    }

    /// Read the content of `branch`.
    ///
    /// With `paths`, only those paths are read and missing ones are simply
    /// absent from the snapshot. Without, the whole tree is read.
    #[instrument(skip(self, paths, config), fields(repo = %self.repo_path.display()))]
    pub fn snapshot_branch(
        &self,
        branch: &str,
        paths: Option<&[String]>,
        config: &SnapshotConfig,
    ) -> Result<BranchSnapshot, GitError> {
        let tree = self.resolve_branch(branch)?.tree()?;

        let entries: Vec<(String, Oid)> = match paths {
            Some(paths) => {
                let mut entries = Vec::with_capacity(paths.len());
                for path in paths {
                    match tree.get_path(Path::new(path)) {
                        Ok(entry) if entry.kind() == Some(ObjectType::Blob) => {
                            entries.push((path.clone(), entry.id()));
                        }
                        Ok(_) => {}
                        Err(e) if e.code() == ErrorCode::NotFound => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                entries
            }
            None => {
                let mut entries = Vec::new();
                tree.walk(TreeWalkMode::PreOrder, |root, entry| {
                    if entry.kind() == Some(ObjectType::Blob) {
                        if let Some(name) = entry.name() {
                            entries.push((format!("{}{}", root, name), entry.id()));
                        }
                    }
                    TreeWalkResult::Ok
                })?;
                entries
            }
        };

        let mut snapshot = BranchSnapshot::default();
        for (path, oid) in entries {
            match self.read_text(&path, oid, config)? {
                BlobText::Text(content) => snapshot.files.insert(path, content),
                BlobText::Skipped => snapshot.skipped.push(path),
            }
        }

        info!(
            files = snapshot.files.len(),
            skipped = snapshot.skipped.len(),
            "branch snapshot complete"
        );
        Ok(snapshot)
    }

    /// List what `source` changes relative to its merge base with `target`.
    ///
    /// `before` holds the merge-base content, i.e. what the proposer last
    /// saw of the target branch. Renames show up as a delete plus an add.
    #[instrument(skip(self, config), fields(repo = %self.repo_path.display()))]
    pub fn proposed_changes(
        &self,
        source: &str,
        target: &str,
        config: &SnapshotConfig,
    ) -> Result<ChangeSet, GitError> {
        let source_commit = self.resolve_branch(source)?;
        let target_commit = self.resolve_branch(target)?;

        let merge_base = self
            .repo
            .merge_base(source_commit.id(), target_commit.id())
            .map_err(|_| GitError::NoMergeBase {
                source_branch: source.to_string(),
                target: target.to_string(),
            })?;
        debug!(%merge_base, "found merge base");

        let ancestor_tree = self.repo.find_commit(merge_base)?.tree()?;
        let source_tree = source_commit.tree()?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&ancestor_tree), Some(&source_tree), None)?;

        let mut set = ChangeSet::default();
        for delta in diff.deltas() {
            let status = match delta.status() {
                Delta::Added => ChangeStatus::Added,
                Delta::Deleted => ChangeStatus::Deleted,
                Delta::Modified | Delta::Typechange => ChangeStatus::Modified,
                other => {
                    debug!(?other, "ignoring delta");
                    continue;
                }
            };

            if delta.old_file().mode() == FileMode::Commit || delta.new_file().mode() == FileMode::Commit {
                debug!("ignoring submodule change");
                continue;
            }

            let file = match status {
                ChangeStatus::Deleted => delta.old_file(),
                _ => delta.new_file(),
            };
            let Some(path) = file.path().map(|p| p.to_string_lossy().into_owned()) else {
                continue;
            };

            // An unreadable side stays absent and the path is reported, so the
            // caller can still tell an edit from a delete on the target.
            let mut unreadable = false;
            let mut side = |oid: Oid| -> Result<Option<String>, GitError> {
                match self.read_text(&path, oid, config)? {
                    BlobText::Text(text) => Ok(Some(text)),
                    BlobText::Skipped => {
                        unreadable = true;
                        Ok(None)
                    }
                }
            };
            let before = match status {
                ChangeStatus::Added => None,
                _ => side(delta.old_file().id())?,
            };
            let after = match status {
                ChangeStatus::Deleted => None,
                _ => side(delta.new_file().id())?,
            };
            if unreadable {
                set.skipped.push(path.clone());
            }

            set.changes.push(ProposedChange {
                path,
                status,
                before,
                after,
            });
        }

        set.changes.sort_by(|a, b| a.path.cmp(&b.path));
        info!(
            changes = set.changes.len(),
            skipped = set.skipped.len(),
            "collected proposed changes"
        );
        Ok(set)
    }

    /// Read a blob as UTF-8 text, honouring the snapshot limits.
    fn read_text(&self, path: &str, oid: Oid, config: &SnapshotConfig) -> Result<BlobText, GitError> {
        let blob = self.repo.find_blob(oid)?;

        if blob.size() as u64 > config.max_file_bytes {
            debug!(path, size = blob.size(), "file exceeds size limit, skipping");
            return Ok(BlobText::Skipped);
        }
        if config.skip_binary && blob.is_binary() {
            debug!(path, "binary file, skipping");
            return Ok(BlobText::Skipped);
        }

        match std::str::from_utf8(blob.content()) {
            Ok(text) => Ok(BlobText::Text(text.to_string())),
            Err(_) if config.skip_binary => {
                warn!(path, "file is not valid UTF-8, skipping");
                Ok(BlobText::Skipped)
            }
            Err(_) => Err(GitError::NotText(path.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::commit_files;
    use super::*;

    fn setup() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_repo_not_found() {
        assert!(matches!(
            GitClient::new("/nonexistent"),
            Err(GitError::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_branch() {
        let (dir, repo) = setup();
        commit_files(&repo, "main", &[], &[("a.txt", "a")]);
        let client = GitClient::new(dir.path()).unwrap();
        let result = client.snapshot_branch("nope", None, &SnapshotConfig::default());
        assert!(matches!(result, Err(GitError::RefNotFound(_))));
    }

    #[test]
    fn test_snapshot_whole_tree() {
        let (dir, repo) = setup();
        commit_files(&repo, "main", &[], &[("a.txt", "a\n"), ("src/lib.rs", "fn x() {}\n")]);
        let client = GitClient::new(dir.path()).unwrap();

        let snap = client.snapshot_branch("main", None, &SnapshotConfig::default()).unwrap();
        assert_eq!(snap.files.len(), 2);
        assert_eq!(snap.files.get("a.txt"), Some("a\n"));
        assert_eq!(snap.files.get("src/lib.rs"), Some("fn x() {}\n"));
        assert!(snap.skipped.is_empty());
    }

    #[test]
    fn test_snapshot_selected_paths() {
        let (dir, repo) = setup();
        commit_files(&repo, "main", &[], &[("a.txt", "a"), ("b.txt", "b")]);
        let client = GitClient::new(dir.path()).unwrap();

        let paths = vec!["b.txt".to_string(), "missing.txt".to_string()];
        let snap = client
            .snapshot_branch("main", Some(&paths), &SnapshotConfig::default())
            .unwrap();
        assert_eq!(snap.files.len(), 1);
        assert_eq!(snap.files.get("b.txt"), Some("b"));
        assert!(!snap.files.contains("missing.txt"));
    }

    #[test]
    fn test_snapshot_skips_large_and_binary() {
        let (dir, repo) = setup();
        commit_files(
            &repo,
            "main",
            &[],
            &[("big.txt", "0123456789"), ("bin.dat", "ab\0cd"), ("ok.txt", "ok")],
        );
        let client = GitClient::new(dir.path()).unwrap();
        let config = SnapshotConfig {
            max_file_bytes: 5,
            skip_binary: true,
        };

        let snap = client.snapshot_branch("main", None, &config).unwrap();
        assert_eq!(snap.files.get("ok.txt"), Some("ok"));
        assert_eq!(snap.skipped, vec!["big.txt".to_string(), "bin.dat".to_string()]);
    }

    #[test]
    fn test_proposed_changes_from_merge_base() {
        let (dir, repo) = setup();
        let root = commit_files(&repo, "main", &[], &[("keep.txt", "k"), ("edit.txt", "v1"), ("drop.txt", "d")]);
        commit_files(
            &repo,
            "feature",
            &[root],
            &[("keep.txt", "k"), ("edit.txt", "v2"), ("new.txt", "n")],
        );
        // Target moves on independently; must not leak into the change set.
        commit_files(&repo, "main", &[root], &[("keep.txt", "k2"), ("edit.txt", "v1"), ("drop.txt", "d")]);

        let client = GitClient::new(dir.path()).unwrap();
        let set = client
            .proposed_changes("feature", "main", &SnapshotConfig::default())
            .unwrap();

        assert!(set.skipped.is_empty());
        assert_eq!(
            set.changes,
            vec![
                ProposedChange::deleted("drop.txt", "d"),
                ProposedChange::modified("edit.txt", "v1", "v2"),
                ProposedChange::added("new.txt", "n"),
            ]
        );
    }

    #[test]
    fn test_proposed_changes_keep_unreadable_side() {
        let (dir, repo) = setup();
        let root = commit_files(&repo, "main", &[], &[("a.txt", "v1"), ("b.txt", "b")]);
        commit_files(&repo, "feature", &[root], &[("a.txt", "rewritten far past the limit"), ("b.txt", "b")]);
        let client = GitClient::new(dir.path()).unwrap();
        let config = SnapshotConfig {
            max_file_bytes: 8,
            skip_binary: true,
        };

        let set = client.proposed_changes("feature", "main", &config).unwrap();
        assert_eq!(set.skipped, vec!["a.txt".to_string()]);
        assert_eq!(
            set.changes,
            vec![ProposedChange {
                path: "a.txt".into(),
                status: ChangeStatus::Modified,
                before: Some("v1".into()),
                after: None,
            }]
        );
    }

    #[test]
    fn test_no_merge_base() {
        let (dir, repo) = setup();
        commit_files(&repo, "main", &[], &[("a.txt", "a")]);
        commit_files(&repo, "orphan", &[], &[("b.txt", "b")]);
        let client = GitClient::new(dir.path()).unwrap();
        let result = client.proposed_changes("orphan", "main", &SnapshotConfig::default());
        assert!(matches!(result, Err(GitError::NoMergeBase { .. })));
    }
}
