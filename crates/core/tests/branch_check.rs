//! End-to-end conflict checks between branches of a real Git repository.
//!
//! Each test builds a throwaway repository with `git2` where a feature
//! branch and `main` diverge from a shared root commit, then runs the whole
//! pipeline: change collection, target snapshot, detection, resolution.

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use gittr_core::config::SnapshotConfig;
use gittr_core::conflict::{ConflictResolver, Merger, Resolution};
use gittr_core::{ConflictKind, GitClient, PrCheck};

// ===========================================================================
// Helpers
// ===========================================================================

/// Commit a flat tree holding exactly `files` onto `branch`.
fn commit(repo: &Repository, branch: &str, parents: &[Oid], files: &[(&str, &str)]) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        builder.insert(name, blob, 0o100644).unwrap();
    }
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();
    let sig = Signature::now("Alice", "alice@example.com").unwrap();
    let parents: Vec<git2::Commit> = parents.iter().map(|p| repo.find_commit(*p).unwrap()).collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some(&format!("refs/heads/{}", branch)), &sig, &sig, "commit", &tree, &parent_refs)
        .unwrap()
}

/// Root has a.txt, b.txt, c.txt, d.txt.
/// feature: edits a.txt, edits b.txt, deletes c.txt, adds e.txt, deletes d.txt.
/// main: edits a.txt (same region), deletes b.txt, edits c.txt, keeps d.txt.
fn diverged_repo() -> (TempDir, GitClient) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let root = commit(
        &repo,
        "main",
        &[],
        &[
            ("a.txt", "one\ntwo\nthree\n"),
            ("b.txt", "bee\n"),
            ("c.txt", "sea\n"),
            ("d.txt", "dee\n"),
        ],
    );
    commit(
        &repo,
        "feature",
        &[root],
        &[
            ("a.txt", "one\nTWO (feature)\nthree\n"),
            ("b.txt", "bee, edited\n"),
            ("e.txt", "new file\n"),
        ],
    );
    commit(
        &repo,
        "main",
        &[root],
        &[
            ("a.txt", "one\nTWO (main)\nthree\n"),
            ("c.txt", "sea, edited\n"),
            ("d.txt", "dee\n"),
        ],
    );

    let client = GitClient::new(dir.path()).unwrap();
    (dir, client)
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn diverged_branches_report_each_kind() {
    let (_dir, client) = diverged_repo();
    let result = PrCheck::from_repository(&client, "feature", "main", &SnapshotConfig::default()).unwrap();

    assert!(result.has_conflicts());
    let kinds: Vec<(&str, ConflictKind)> = result
        .conflicts()
        .iter()
        .map(|c| (c.path.as_str(), c.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("a.txt", ConflictKind::EditEdit),
            ("b.txt", ConflictKind::EditDelete),
            ("c.txt", ConflictKind::DeleteEdit),
        ]
    );
}

#[test]
fn reverse_direction_only_sees_main_changes() {
    let (_dir, client) = diverged_repo();
    let result = PrCheck::from_repository(&client, "main", "feature", &SnapshotConfig::default()).unwrap();

    // main edited a.txt and c.txt; feature has its own a.txt and no c.txt.
    let kinds: Vec<(&str, ConflictKind)> = result
        .conflicts()
        .iter()
        .map(|c| (c.path.as_str(), c.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("a.txt", ConflictKind::EditEdit),
            ("b.txt", ConflictKind::DeleteEdit),
            ("c.txt", ConflictKind::EditDelete),
        ]
    );
}

#[test]
fn unreadable_content_still_reports_edit_of_deleted_file() {
    let (_dir, client) = diverged_repo();
    let config = SnapshotConfig {
        max_file_bytes: 1,
        skip_binary: true,
    };
    let result = PrCheck::from_repository(&client, "feature", "main", &config).unwrap();

    let kinds: Vec<(&str, ConflictKind)> = result
        .conflicts()
        .iter()
        .map(|c| (c.path.as_str(), c.kind))
        .collect();
    assert_eq!(kinds, vec![("b.txt", ConflictKind::EditDelete)]);
    assert_eq!(result.skipped(), ["a.txt", "c.txt", "d.txt"].map(String::from));
}

#[test]
fn branch_checked_against_itself_is_clean() {
    let (_dir, client) = diverged_repo();
    let result = PrCheck::from_repository(&client, "main", "main", &SnapshotConfig::default()).unwrap();
    assert!(!result.has_conflicts());
}

#[test]
fn manual_resolution_drafts_merge_and_pr_resolution_clears_conflict() {
    let (_dir, client) = diverged_repo();
    let config = SnapshotConfig::default();
    let result = PrCheck::from_repository(&client, "feature", "main", &config).unwrap();
    let conflict = result.find("a.txt").unwrap();

    let manual = ConflictResolver::resolve(conflict, Resolution::Manual);
    assert!(!manual.resolved);
    let draft = Merger::draft_for(conflict, "main").unwrap();
    assert!(draft.has_conflicts);
    assert!(draft.merged_content.contains("TWO (feature)"));
    assert!(draft.merged_content.contains("TWO (main)"));
    assert!(!draft.merged_content.contains("|||||||"));

    let mut changes = client.proposed_changes("feature", "main", &config).unwrap().changes;
    let snapshot = client.snapshot_branch("main", None, &config).unwrap();
    let resolved = ConflictResolver::resolve(conflict, Resolution::Pr);
    ConflictResolver::apply(&mut changes, conflict, &resolved).unwrap();

    let recheck = gittr_core::ConflictDetector::detect(&changes, &snapshot.files, "main");
    assert!(recheck.find("a.txt").is_none());
}
