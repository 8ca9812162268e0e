use std::path::{Path, PathBuf};

use doctrack_check::{ContentSource, DiffSource};
use doctrack_core::DocTrackError;
use git2::{DiffFormat, DiffOptions, Repository, Tree};

/// A repository plus the comparison to run against it.
///
/// The pre-image side is always a revision (default `HEAD`); the post-image
/// side is a revision or, when unset, the working tree including staged
/// changes.
///
/// # Examples
///
/// ```no_run
/// use doctrack_check::DiffSource;
/// use doctrack_git::GitRepository;
///
/// let repo = GitRepository::discover(".")
///     .unwrap()
///     .with_versions("main", None)
///     .with_pathspec("src");
/// let patch = repo.diff_text().unwrap();
/// println!("{patch}");
/// ```
pub struct GitRepository {
    repo: Repository,
    version_from: String,
    version_to: Option<String>,
    pathspecs: Vec<String>,
}

impl GitRepository {
    /// Open the repository whose root is `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Git`] if `path` is not a repository root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocTrackError> {
        let repo = Repository::open(path.as_ref())
            .map_err(|e| DocTrackError::Git(format!("failed to open repository: {e}")))?;
        Ok(Self::from_repository(repo))
    }

    /// Find the repository containing `path`, searching parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Git`] if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, DocTrackError> {
        let repo = Repository::discover(path.as_ref()).map_err(|e| {
            DocTrackError::Git(format!(
                "no git repository found at {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self::from_repository(repo))
    }

    fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            version_from: "HEAD".into(),
            version_to: None,
            pathspecs: Vec::new(),
        }
    }

    /// Compare `from` with `to`, or with the working tree when `to` is `None`.
    pub fn with_versions(mut self, from: impl Into<String>, to: Option<String>) -> Self {
        self.version_from = from.into();
        self.version_to = to;
        self
    }

    /// Restrict the diff to paths matching `spec`.
    pub fn with_pathspec(mut self, spec: impl Into<String>) -> Self {
        self.pathspecs.push(spec.into());
        self
    }

    pub fn version_from(&self) -> &str {
        &self.version_from
    }

    pub fn version_to(&self) -> Option<&str> {
        self.version_to.as_deref()
    }

    /// Root of the working tree, `None` for bare repositories.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn tree_at(&self, rev: &str) -> Result<Tree<'_>, DocTrackError> {
        self.repo
            .revparse_single(rev)
            .and_then(|object| object.peel_to_tree())
            .map_err(|e| DocTrackError::Git(format!("failed to resolve '{rev}': {e}")))
    }

    fn blob_text(&self, rev: &str, path: &Path) -> Result<String, String> {
        let tree = self.tree_at(rev).map_err(|e| e.to_string())?;
        let entry = tree
            .get_path(path)
            .map_err(|e| e.message().to_string())?;
        let blob = entry
            .to_object(&self.repo)
            .and_then(|object| object.peel_to_blob())
            .map_err(|e| e.message().to_string())?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }

    fn workdir_text(&self, path: &Path) -> Result<String, String> {
        let root = self
            .repo
            .workdir()
            .ok_or_else(|| "repository has no working tree".to_string())?;
        let bytes = std::fs::read(root.join(path)).map_err(|e| e.to_string())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl DiffSource for GitRepository {
    /// Zero-context patch text, equivalent to `git diff -U0 <from> [<to>]`.
    fn diff_text(&self) -> Result<String, DocTrackError> {
        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        for spec in &self.pathspecs {
            opts.pathspec(spec);
        }

        let old_tree = self.tree_at(&self.version_from)?;
        let diff = match &self.version_to {
            Some(rev) => {
                let new_tree = self.tree_at(rev)?;
                self.repo
                    .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))
            }
            None => self
                .repo
                .diff_tree_to_workdir_with_index(Some(&old_tree), Some(&mut opts)),
        }
        .map_err(|e| DocTrackError::Git(format!("failed to compute diff: {e}")))?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .map_err(|e| DocTrackError::Git(format!("failed to format diff: {e}")))?;

        tracing::debug!(
            from = %self.version_from,
            to = self.version_to.as_deref().unwrap_or("working tree"),
            files = diff.deltas().len(),
            "computed diff"
        );
        Ok(text)
    }
}

impl ContentSource for GitRepository {
    fn content(&self, path: &Path, version: Option<&str>) -> Result<String, DocTrackError> {
        let result = match version {
            Some(rev) => self.blob_text(rev, path),
            None => self.workdir_text(path),
        };
        result.map_err(|reason| DocTrackError::MissingContent {
            path: PathBuf::from(path),
            version: version.map(str::to_string),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{IndexAddOption, Oid, Signature};
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_all(repo: &Repository, message: &str) -> Oid {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn working_tree_diff_has_zero_context() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.py"), "a = 1\nb = 2\nc = 3\n").unwrap();
        commit_all(&repo, "initial");
        std::fs::write(dir.path().join("a.py"), "a = 1\nb = 20\nc = 3\n").unwrap();

        let source = GitRepository::open(dir.path()).unwrap();
        let text = source.diff_text().unwrap();
        assert!(text.contains("+++ b/a.py"));
        assert!(text.contains("@@ -2 +2 @@"));
        assert!(text.contains("-b = 2\n"));
        assert!(text.contains("+b = 20\n"));
        assert!(text.lines().all(|line| !line.starts_with(' ')));
    }

    #[test]
    fn diff_between_revisions() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        let first = commit_all(&repo, "first");
        std::fs::write(dir.path().join("a.py"), "x = 1\ny = 2\n").unwrap();
        let second = commit_all(&repo, "second");

        let source = GitRepository::open(dir.path())
            .unwrap()
            .with_versions(first.to_string(), Some(second.to_string()));
        let text = source.diff_text().unwrap();
        assert!(text.contains("@@ -1,0 +2 @@"));
        assert!(text.contains("+y = 2"));
    }

    #[test]
    fn pathspec_limits_files() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.py"), "a\n").unwrap();
        std::fs::write(dir.path().join("b.py"), "b\n").unwrap();
        commit_all(&repo, "initial");
        std::fs::write(dir.path().join("a.py"), "aa\n").unwrap();
        std::fs::write(dir.path().join("b.py"), "bb\n").unwrap();

        let source = GitRepository::open(dir.path())
            .unwrap()
            .with_pathspec("b.py");
        let text = source.diff_text().unwrap();
        assert!(text.contains("+++ b/b.py"));
        assert!(!text.contains("a.py"));
    }

    #[test]
    fn content_at_revision_and_working_tree() {
        let (dir, repo) = init_repo();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/m.py"), "old\n").unwrap();
        commit_all(&repo, "initial");
        std::fs::write(dir.path().join("pkg/m.py"), "new\n").unwrap();

        let source = GitRepository::open(dir.path()).unwrap();
        let path = Path::new("pkg/m.py");
        assert_eq!(source.content(path, Some("HEAD")).unwrap(), "old\n");
        assert_eq!(source.content(path, None).unwrap(), "new\n");
    }

    #[test]
    fn missing_file_is_missing_content() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.py"), "a\n").unwrap();
        commit_all(&repo, "initial");

        let source = GitRepository::open(dir.path()).unwrap();
        let err = source
            .content(Path::new("nope.py"), Some("HEAD"))
            .unwrap_err();
        assert!(matches!(err, DocTrackError::MissingContent { .. }));
        let err = source.content(Path::new("nope.py"), None).unwrap_err();
        assert!(err.to_string().contains("working tree"));
    }

    #[test]
    fn unknown_revision_is_a_git_error() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.py"), "a\n").unwrap();
        commit_all(&repo, "initial");

        let source = GitRepository::open(dir.path())
            .unwrap()
            .with_versions("no-such-branch", None);
        assert!(matches!(source.diff_text(), Err(DocTrackError::Git(_))));
    }

    #[test]
    fn discover_from_subdirectory() {
        let (dir, _repo) = init_repo();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let source = GitRepository::discover(dir.path().join("nested")).unwrap();
        assert!(source.workdir().is_some());
        assert_eq!(source.version_from(), "HEAD");
        assert!(source.version_to().is_none());
    }

    #[test]
    fn open_outside_repository_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            GitRepository::open(dir.path()),
            Err(DocTrackError::Git(_))
        ));
    }
}
