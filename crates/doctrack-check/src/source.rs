use std::collections::HashMap;
use std::path::{Path, PathBuf};

use doctrack_core::DocTrackError;

/// Supplies raw unified-diff text.
pub trait DiffSource {
    /// # Errors
    ///
    /// Implementations return an error when the diff cannot be produced.
    fn diff_text(&self) -> Result<String, DocTrackError>;
}

/// Supplies full file images.
pub trait ContentSource {
    /// Text of `path` at `version`, or the working copy when `version` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::MissingContent`] when the file does not exist
    /// at that version or cannot be read.
    fn content(&self, path: &Path, version: Option<&str>) -> Result<String, DocTrackError>;
}

impl<T: DiffSource + ?Sized> DiffSource for &T {
    fn diff_text(&self) -> Result<String, DocTrackError> {
        (**self).diff_text()
    }
}

impl<T: ContentSource + ?Sized> ContentSource for &T {
    fn content(&self, path: &Path, version: Option<&str>) -> Result<String, DocTrackError> {
        (**self).content(path, version)
    }
}

/// Diff text that is already in memory, e.g. read from a file or stdin.
///
/// # Examples
///
/// ```
/// use doctrack_check::{DiffSource, StaticDiff};
///
/// let diff = StaticDiff::new("+++ b/a.py\n@@ -1 +1 @@\n-a\n+b\n");
/// assert!(diff.diff_text().unwrap().starts_with("+++"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticDiff(String);

impl StaticDiff {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl DiffSource for StaticDiff {
    fn diff_text(&self) -> Result<String, DocTrackError> {
        Ok(self.0.clone())
    }
}

/// File images keyed by path and version.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use doctrack_check::{ContentSource, MemoryContent};
///
/// let content = MemoryContent::new()
///     .with_file("a.py", Some("HEAD"), "old\n")
///     .with_file("a.py", None, "new\n");
/// assert_eq!(content.content(Path::new("a.py"), Some("HEAD")).unwrap(), "old\n");
/// assert_eq!(content.content(Path::new("a.py"), None).unwrap(), "new\n");
/// assert!(content.content(Path::new("b.py"), None).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryContent {
    files: HashMap<(PathBuf, Option<String>), String>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        version: Option<&str>,
        text: impl Into<String>,
    ) {
        self.files
            .insert((path.into(), version.map(str::to_string)), text.into());
    }

    pub fn with_file(
        mut self,
        path: impl Into<PathBuf>,
        version: Option<&str>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(path, version, text);
        self
    }
}

impl ContentSource for MemoryContent {
    fn content(&self, path: &Path, version: Option<&str>) -> Result<String, DocTrackError> {
        self.files
            .get(&(path.to_path_buf(), version.map(str::to_string)))
            .cloned()
            .ok_or_else(|| DocTrackError::MissingContent {
                path: path.to_path_buf(),
                version: version.map(str::to_string),
                reason: "no such file".into(),
            })
    }
}
