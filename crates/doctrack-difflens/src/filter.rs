//! Drop diff content that never needs a documentation check.
//!
//! Excluded paths are removed before any file content is fetched, and
//! whitespace-only hunks are removed when `skip_blank_lines` is on.

use std::fmt;
use std::path::{Path, PathBuf};

use doctrack_core::{DocTrackConfig, Hunk};

use crate::parser::FileDiff;

/// Why a file or hunk was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The path matched an `exclude` glob.
    PatternMatch(String),
    /// Every changed line of the hunk is blank.
    BlankLinesOnly,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PatternMatch(pattern) => write!(f, "matches exclude pattern {pattern}"),
            SkipReason::BlankLinesOnly => write!(f, "blank lines only"),
        }
    }
}

/// A file (`hunk: None`) or a single hunk removed by the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub hunk: Option<Hunk>,
    pub reason: SkipReason,
}

/// Outcome of [`DiffFilter::filter`].
#[derive(Debug, Clone, Default)]
pub struct FilterResult {
    /// Files left to check, with their remaining hunks.
    pub kept: Vec<FileDiff>,
    /// Everything that was dropped, in diff order.
    pub skipped: Vec<Skipped>,
}

/// Path and blank-line filter applied to parsed diffs.
///
/// # Examples
///
/// ```
/// use doctrack_difflens::filter::DiffFilter;
///
/// let filter = DiffFilter::new(&["vendor/**".to_string()], true);
/// assert!(filter.is_excluded("vendor/lib.py"));
/// assert!(!filter.is_excluded("src/lib.py"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiffFilter {
    exclude: Vec<glob::Pattern>,
    skip_blank_lines: bool,
}

impl DiffFilter {
    /// Build a filter from raw glob patterns. Invalid patterns are ignored
    /// with a warning.
    pub fn new(patterns: &[String], skip_blank_lines: bool) -> Self {
        let mut exclude = Vec::new();
        for pat in patterns {
            match glob::Pattern::new(pat) {
                Ok(p) => exclude.push(p),
                Err(e) => tracing::warn!("ignoring invalid exclude pattern {pat:?}: {e}"),
            }
        }
        Self {
            exclude,
            skip_blank_lines,
        }
    }

    /// Create a filter from configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use doctrack_core::DocTrackConfig;
    /// use doctrack_difflens::filter::DiffFilter;
    ///
    /// let config = DocTrackConfig::default();
    /// let filter = DiffFilter::from_config(&config);
    /// assert!(!filter.is_excluded("src/main.py"));
    /// ```
    pub fn from_config(config: &DocTrackConfig) -> Self {
        Self::new(&config.exclude, config.skip_blank_lines)
    }

    /// Returns `true` if `path` matches one of the exclude patterns.
    pub fn is_excluded(&self, path: impl AsRef<Path>) -> bool {
        self.matching_pattern(path.as_ref()).is_some()
    }

    fn matching_pattern(&self, path: &Path) -> Option<&glob::Pattern> {
        self.exclude.iter().find(|p| p.matches_path(path))
    }

    /// Split parsed diffs into what still needs checking and what was skipped.
    pub fn filter(&self, diffs: Vec<FileDiff>) -> FilterResult {
        let mut result = FilterResult::default();

        for mut diff in diffs {
            if let Some(pattern) = self.matching_pattern(&diff.path) {
                tracing::debug!(path = %diff.path.display(), %pattern, "excluded");
                result.skipped.push(Skipped {
                    path: diff.path.clone(),
                    hunk: None,
                    reason: SkipReason::PatternMatch(pattern.to_string()),
                });
                continue;
            }

            if self.skip_blank_lines {
                let (blank, kept): (Vec<_>, Vec<_>) =
                    diff.hunks.into_iter().partition(|h| h.is_blank_only());
                for hunk in blank {
                    result.skipped.push(Skipped {
                        path: diff.path.clone(),
                        hunk: Some(hunk.hunk),
                        reason: SkipReason::BlankLinesOnly,
                    });
                }
                diff.hunks = kept;
            }

            result.kept.push(diff);
        }

        result
    }
}
