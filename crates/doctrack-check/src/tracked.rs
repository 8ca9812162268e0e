use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use doctrack_core::Hunk;
use serde::Serialize;

/// Tracked hunks grouped by file.
///
/// Hunks compare by value, so recording the same hunk twice keeps one copy.
///
/// # Examples
///
/// ```
/// use doctrack_core::{Hunk, LineRange};
/// use doctrack_check::TrackedDifferences;
///
/// let mut tracked = TrackedDifferences::new();
/// let hunk = Hunk::new(LineRange::new(1, 2), None);
/// assert!(tracked.insert("bar.py", hunk));
/// assert!(!tracked.insert("bar.py", hunk));
/// assert_eq!(tracked.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrackedDifferences {
    files: BTreeMap<PathBuf, BTreeSet<Hunk>>,
}

impl TrackedDifferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hunk` for `path`. Returns `false` if it was already present.
    pub fn insert(&mut self, path: impl Into<PathBuf>, hunk: Hunk) -> bool {
        self.files.entry(path.into()).or_default().insert(hunk)
    }

    pub fn contains(&self, path: impl AsRef<Path>, hunk: &Hunk) -> bool {
        self.files
            .get(path.as_ref())
            .is_some_and(|hunks| hunks.contains(hunk))
    }

    /// Tracked hunks of one file.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&BTreeSet<Hunk>> {
        self.files.get(path.as_ref())
    }

    /// `true` when nothing is tracked; the review gate passes.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of tracked hunks across all files.
    pub fn len(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &BTreeSet<Hunk>)> {
        self.files.iter()
    }

}
