//! Engine driven by a real repository: diff and images both come from git.

use std::path::Path;

use doctrack_check::Checker;
use doctrack_core::{Hunk, LineRange, TagMarkers};
use doctrack_git::GitRepository;
use git2::{IndexAddOption, Repository, Signature};
use tempfile::TempDir;

fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

const TRACKED_V1: &str = "\
# doc-track
def area(r):
    return 3.14 * r * r


def perimeter(r):
    return 2 * 3.14 * r
";

const TRACKED_V2: &str = "\
# doc-track
def area(r):
    return math.pi * r * r


def perimeter(r):
    return 2 * math.pi * r
";

#[test]
fn working_tree_changes_against_head() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    write(dir.path(), "geometry.py", TRACKED_V1);
    commit_all(&repo, "initial");
    write(dir.path(), "geometry.py", TRACKED_V2);

    let source = GitRepository::open(dir.path()).unwrap();
    let outcome = Checker::new(TagMarkers::default())
        .check(&source, &source)
        .unwrap();

    assert_eq!(outcome.tracked.len(), 1);
    assert!(outcome.tracked.contains(
        "geometry.py",
        &Hunk::new(LineRange::new(2, 2), LineRange::new(2, 2))
    ));
    assert_eq!(outcome.hunks_checked(), 2);
}

#[test]
fn committed_range_between_revisions() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    write(dir.path(), "geometry.py", TRACKED_V1);
    let first = commit_all(&repo, "first").to_string();
    write(dir.path(), "geometry.py", TRACKED_V2);
    let second = commit_all(&repo, "second").to_string();
    // Working tree edits must not leak into a revision-to-revision check.
    write(dir.path(), "geometry.py", "# emptied\n");

    let source = GitRepository::open(dir.path())
        .unwrap()
        .with_versions(first.clone(), Some(second.clone()));
    let outcome = Checker::new(TagMarkers::default())
        .with_versions(Some(first), Some(second))
        .check(&source, &source)
        .unwrap();

    assert_eq!(outcome.tracked.len(), 1);
}

#[test]
fn new_file_is_checked_against_working_tree_only() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    write(dir.path(), "README.md", "hello\n");
    commit_all(&repo, "initial");
    write(dir.path(), "api.py", "# doc-track\ndef handler():\n    pass\n");
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("api.py")).unwrap();
    index.write().unwrap();

    let source = GitRepository::open(dir.path()).unwrap();
    let outcome = Checker::new(TagMarkers::default())
        .check(&source, &source)
        .unwrap();

    assert!(outcome
        .tracked
        .contains("api.py", &Hunk::new(None, LineRange::new(0, 2))));
}

#[test]
fn clean_tree_has_nothing_tracked() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    write(dir.path(), "geometry.py", TRACKED_V1);
    commit_all(&repo, "initial");

    let source = GitRepository::open(dir.path()).unwrap();
    let outcome = Checker::new(TagMarkers::default())
        .check(&source, &source)
        .unwrap();
    assert!(outcome.tracked.is_empty());
    assert!(outcome.files.is_empty());
}
