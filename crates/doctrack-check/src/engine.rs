//! The tag resolution procedure.
//!
//! A line range is tracked when any of these holds, checked in order:
//! 1. the run of blank and comment-only lines directly above it holds a tag line
//! 2. a line inside it carries a tagged comment
//! 3. rule 1 or 2 holds for the header of a scope enclosing its first line
//!
//! Each hunk checks its removed side against the pre-image first and only
//! falls back to its added side against the post-image when that fails.

use std::path::{Path, PathBuf};

use doctrack_core::{DocTrackConfig, DocTrackError, Hunk, LineRange, TagMarkers};
use doctrack_difflens::filter::{DiffFilter, FilterResult, Skipped};
use doctrack_difflens::parser::{parse_unified_diff, FileDiff};
use doctrack_syntax::{CommentClassifier, Language, LanguageMap, ScopeResolver, SyntaxTree};

use crate::source::{ContentSource, DiffSource};
use crate::tracked::TrackedDifferences;

/// Revision the pre-image is read from unless configured otherwise.
pub const DEFAULT_VERSION_FROM: &str = "HEAD";

/// Everything a check run produced.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    /// Tracked hunks per file. Empty means the gate passes.
    pub tracked: TrackedDifferences,
    /// Files that were checked, with their hunk text for display.
    pub files: Vec<FileDiff>,
    /// Files and hunks dropped by the diff filter.
    pub skipped: Vec<Skipped>,
    /// Files with no grammar for their extension.
    pub unsupported: Vec<PathBuf>,
}

impl CheckOutcome {
    /// Number of hunks that went through the decision procedure.
    pub fn hunks_checked(&self) -> usize {
        self.files.iter().map(|f| f.hunks.len()).sum()
    }
}

/// Runs the tag resolution procedure over a diff.
///
/// # Examples
///
/// ```
/// use doctrack_core::TagMarkers;
/// use doctrack_check::{Checker, MemoryContent, StaticDiff};
///
/// let diff = StaticDiff::new("diff --git a/a.py b/a.py\n+++ b/a.py\n@@ -2 +2 @@\n-    return 1\n+    return 2\n");
/// let content = MemoryContent::new()
///     .with_file("a.py", Some("HEAD"), "# doc-track\ndef f():\n    return 1\n")
///     .with_file("a.py", None, "# doc-track\ndef f():\n    return 2\n");
///
/// let outcome = Checker::new(TagMarkers::default()).check(&diff, &content).unwrap();
/// assert_eq!(outcome.tracked.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Checker {
    markers: TagMarkers,
    languages: LanguageMap,
    filter: DiffFilter,
    version_from: Option<String>,
    version_to: Option<String>,
}

impl Checker {
    /// A checker comparing `HEAD` with the working copy, with no path
    /// filtering and built-in language detection.
    pub fn new(markers: TagMarkers) -> Self {
        Self {
            markers,
            languages: LanguageMap::default(),
            filter: DiffFilter::default(),
            version_from: Some(DEFAULT_VERSION_FROM.to_string()),
            version_to: None,
        }
    }

    /// Build a checker from configuration: markers, excludes, blank-line
    /// skipping and language overrides.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Config`] for an empty tag or an unknown
    /// language override.
    pub fn from_config(config: &DocTrackConfig) -> Result<Self, DocTrackError> {
        Ok(Self::new(config.markers()?)
            .with_languages(LanguageMap::from_config(config)?)
            .with_filter(DiffFilter::from_config(config)))
    }

    /// Set the versions the pre-image and post-image are read at.
    /// `None` reads the working copy.
    pub fn with_versions(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.version_from = from;
        self.version_to = to;
        self
    }

    /// Replace the path and blank-line filter applied before any content
    /// is fetched.
    pub fn with_filter(mut self, filter: DiffFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace extension-based language detection.
    pub fn with_languages(mut self, languages: LanguageMap) -> Self {
        self.languages = languages;
        self
    }

    pub fn markers(&self) -> &TagMarkers {
        &self.markers
    }

    pub fn version_from(&self) -> Option<&str> {
        self.version_from.as_deref()
    }

    pub fn version_to(&self) -> Option<&str> {
        self.version_to.as_deref()
    }

    /// Parse the diff, filter it, and decide every remaining hunk.
    ///
    /// # Errors
    ///
    /// Propagates diff source failures and [`DocTrackError::MissingContent`]
    /// for any file whose pre-image or post-image is needed but unavailable.
    pub fn check<D, C>(&self, diff: &D, content: &C) -> Result<CheckOutcome, DocTrackError>
    where
        D: DiffSource + ?Sized,
        C: ContentSource + ?Sized,
    {
        let text = diff.diff_text()?;
        let FilterResult { kept, skipped } = self.filter.filter(parse_unified_diff(&text));
        let mut outcome = CheckOutcome {
            skipped,
            ..CheckOutcome::default()
        };

        for file in kept {
            if file.hunks.is_empty() {
                continue;
            }
            let Some(language) = self.languages.detect(&file.path) else {
                tracing::debug!(path = %file.path.display(), "no grammar for file, skipping");
                outcome.unsupported.push(file.path);
                continue;
            };

            let hunks: Vec<Hunk> = file.hunks.iter().map(|h| h.hunk).collect();
            for hunk in self.check_file(&file.path, language, &hunks, content)? {
                outcome.tracked.insert(file.path.clone(), hunk);
            }
            outcome.files.push(file);
        }

        tracing::info!(
            markers = self.markers.len(),
            files = outcome.files.len(),
            hunks = outcome.hunks_checked(),
            tracked = outcome.tracked.len(),
            "check finished"
        );
        Ok(outcome)
    }

    /// Decide the hunks of one file, returning the tracked ones in input order.
    ///
    /// The pre-image is fetched only when some hunk removes lines, and the
    /// post-image only when some hunk is still undecided and adds lines.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::MissingContent`] when a needed image cannot
    /// be fetched, or [`DocTrackError::Parse`] if the grammar fails to load.
    pub fn check_file<C>(
        &self,
        path: &Path,
        language: Language,
        hunks: &[Hunk],
        content: &C,
    ) -> Result<Vec<Hunk>, DocTrackError>
    where
        C: ContentSource + ?Sized,
    {
        let mut classifier = CommentClassifier::new(language, self.markers.clone())?;
        let mut resolver = ScopeResolver::new(language)?;
        let mut decided = vec![false; hunks.len()];

        if hunks.iter().any(|h| h.removed.is_some()) {
            let text = content.content(path, self.version_from())?;
            let mut image = Image::new(resolver.parse(text));
            for (hunk, tracked) in hunks.iter().zip(decided.iter_mut()) {
                if let Some(range) = hunk.removed {
                    *tracked = image.range_is_tracked(&mut classifier, range);
                }
            }
        }

        let undecided_additions = hunks
            .iter()
            .zip(&decided)
            .any(|(hunk, tracked)| !tracked && hunk.added.is_some());
        if undecided_additions {
            let text = content.content(path, self.version_to())?;
            let mut image = Image::new(resolver.parse(text));
            for (hunk, tracked) in hunks.iter().zip(decided.iter_mut()) {
                if *tracked {
                    continue;
                }
                if let Some(range) = hunk.added {
                    *tracked = image.range_is_tracked(&mut classifier, range);
                }
            }
        }

        let tracked: Vec<Hunk> = hunks
            .iter()
            .zip(decided)
            .filter_map(|(hunk, tracked)| tracked.then_some(*hunk))
            .collect();
        tracing::debug!(
            path = %path.display(),
            %language,
            hunks = hunks.len(),
            tracked = tracked.len(),
            "file checked"
        );
        Ok(tracked)
    }

    /// Decide a single line range of a full file image.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Parse`] if the grammar fails to load.
    ///
    /// # Examples
    ///
    /// ```
    /// use doctrack_core::{LineRange, TagMarkers};
    /// use doctrack_check::Checker;
    /// use doctrack_syntax::Language;
    ///
    /// let checker = Checker::new(TagMarkers::new(["# test"]).unwrap());
    /// let source = "# test\ndef f():\n    return 1\n";
    /// let range = LineRange::single(2);
    /// assert!(checker.range_is_tracked(source, Language::Python, range).unwrap());
    /// ```
    pub fn range_is_tracked(
        &self,
        source: &str,
        language: Language,
        range: LineRange,
    ) -> Result<bool, DocTrackError> {
        let mut classifier = CommentClassifier::new(language, self.markers.clone())?;
        let mut resolver = ScopeResolver::new(language)?;
        let mut image = Image::new(resolver.parse(source));
        Ok(image.range_is_tracked(&mut classifier, range))
    }
}

/// Parse `diff`, fetch images from `content`, and return the tracked hunks,
/// comparing `HEAD` with the working copy.
///
/// # Errors
///
/// See [`Checker::check`].
pub fn resolve_tracked_differences<D, C>(
    diff: &D,
    content: &C,
    markers: &TagMarkers,
) -> Result<TrackedDifferences, DocTrackError>
where
    D: DiffSource + ?Sized,
    C: ContentSource + ?Sized,
{
    Checker::new(markers.clone())
        .check(diff, content)
        .map(|outcome| outcome.tracked)
}

/// How a single line classifies.
#[derive(Debug, Clone, Copy, Default)]
struct LineClass {
    blank: bool,
    comment: bool,
    tag: bool,
    tagged: bool,
}

impl LineClass {
    const BLANK: Self = Self {
        blank: true,
        comment: false,
        tag: false,
        tagged: false,
    };

    fn of(classifier: &mut CommentClassifier, text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::BLANK;
        }
        match classifier.classify(text) {
            Some(comment) => {
                let matched = classifier.markers().matches(&comment.text);
                Self {
                    blank: false,
                    comment: comment.standalone,
                    tag: comment.standalone && matched,
                    tagged: matched,
                }
            }
            None => Self::default(),
        }
    }
}

/// One parsed file image with memoized line classes.
struct Image {
    tree: SyntaxTree,
    classes: Vec<Option<LineClass>>,
}

impl Image {
    fn new(tree: SyntaxTree) -> Self {
        let classes = vec![None; tree.line_count()];
        Self { tree, classes }
    }

    /// Lines past the end of the image classify as blank.
    fn class(&mut self, classifier: &mut CommentClassifier, line: usize) -> LineClass {
        if let Some(Some(class)) = self.classes.get(line) {
            return *class;
        }
        let Some(text) = self.tree.line(line) else {
            return LineClass::BLANK;
        };
        let class = LineClass::of(classifier, text);
        self.classes[line] = Some(class);
        class
    }

    fn range_is_tracked(&mut self, classifier: &mut CommentClassifier, range: LineRange) -> bool {
        // A range with no real lines in this image touches nothing.
        if range.from() >= self.tree.line_count() {
            return false;
        }
        if self.block_is_tagged(classifier, range) {
            return true;
        }
        let chain = self.tree.scope_chain(range.from());
        let found = chain
            .iter()
            .find(|scope| self.block_is_tagged(classifier, scope.header()));
        if let Some(scope) = found {
            tracing::trace!(kind = %scope.kind, name = %scope.name, "tracked through enclosing scope");
        }
        found.is_some()
    }

    fn block_is_tagged(&mut self, classifier: &mut CommentClassifier, range: LineRange) -> bool {
        self.preceding_run_is_tagged(classifier, range.from())
            || self.any_line_tagged(classifier, range)
    }

    /// Walk up from `from - 1` over blank and comment-only lines.
    fn preceding_run_is_tagged(&mut self, classifier: &mut CommentClassifier, from: usize) -> bool {
        let mut line = from.min(self.tree.line_count());
        while line > 0 {
            line -= 1;
            let class = self.class(classifier, line);
            if !(class.blank || class.comment) {
                return false;
            }
            if class.tag {
                return true;
            }
        }
        false
    }

    fn any_line_tagged(&mut self, classifier: &mut CommentClassifier, range: LineRange) -> bool {
        let last = range.to().min(self.tree.line_count().saturating_sub(1));
        if range.from() > last || self.tree.line_count() == 0 {
            return false;
        }
        (range.from()..=last).any(|line| self.class(classifier, line).tagged)
    }
}
