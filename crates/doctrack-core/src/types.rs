use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DocTrackError;

/// A 0-based, inclusive range of lines.
///
/// `from <= to` always holds; the constructors refuse inverted ranges.
///
/// # Examples
///
/// ```
/// use doctrack_core::LineRange;
///
/// let range = LineRange::new(3, 5).unwrap();
/// assert_eq!(range.len(), 3);
/// assert!(LineRange::new(5, 3).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineRange {
    from: usize,
    to: usize,
}

impl LineRange {
    /// Build a range, returning `None` when `from > to`.
    pub fn new(from: usize, to: usize) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    /// A range covering a single line.
    pub fn single(line: usize) -> Self {
        Self {
            from: line,
            to: line,
        }
    }

    /// Convert one side of a unified-diff hunk header (1-based start, line
    /// count) into a 0-based range. A count of zero means the side is absent,
    /// as does a count whose last line does not fit in `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use doctrack_core::LineRange;
    ///
    /// assert_eq!(LineRange::from_diff_side(10, 2), LineRange::new(9, 10));
    /// assert_eq!(LineRange::from_diff_side(0, 0), None);
    /// assert_eq!(LineRange::from_diff_side(5, usize::MAX), None);
    /// ```
    pub fn from_diff_side(start: usize, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let from = start.saturating_sub(1);
        let to = from.checked_add(count - 1)?;
        Some(Self { from, to })
    }

    /// First line of the range.
    pub fn from(&self) -> usize {
        self.from
    }

    /// Last line of the range (inclusive).
    pub fn to(&self) -> usize {
        self.to
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.to - self.from + 1
    }

    /// Always `false`; a range covers at least one line.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over the covered line indices.
    pub fn lines(&self) -> RangeInclusive<usize> {
        self.from..=self.to
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// One contiguous diff region: an optional removed range in the pre-image and
/// an optional added range in the post-image.
///
/// A side is `None` when the hunk header gives it a length of zero. Equality,
/// ordering, and hashing are structural, so a hunk reached through several
/// checks is still stored once in a set.
///
/// # Examples
///
/// ```
/// use doctrack_core::{Hunk, LineRange};
///
/// let hunk = Hunk::new(None, LineRange::new(0, 2));
/// assert_eq!(hunk.to_string(), "-(-1,-1) +(0,2)");
/// assert_eq!(hunk.anchor_line(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// Lines removed from the pre-image, if any.
    pub removed: Option<LineRange>,
    /// Lines added to the post-image, if any.
    pub added: Option<LineRange>,
}

impl Hunk {
    /// A hunk from its two sides. At least one side is normally present;
    /// the parser never produces a hunk with both absent.
    pub fn new(removed: Option<LineRange>, added: Option<LineRange>) -> Self {
        Self { removed, added }
    }

    /// First line touched by the hunk, preferring the removed side.
    ///
    /// Used to order hunks for display.
    pub fn anchor_line(&self) -> usize {
        self.removed
            .or(self.added)
            .map(|range| range.from())
            .unwrap_or(0)
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |range: Option<LineRange>| match range {
            Some(r) => format!("({},{})", r.from(), r.to()),
            None => "(-1,-1)".to_string(),
        };
        write!(f, "-{} +{}", side(self.removed), side(self.added))
    }
}

/// Kind of named lexical region a scope represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeKind {
    /// Function, method, or constructor definition.
    Function,
    /// Class-like definition (class, struct, trait, interface, module...).
    Class,
    /// Markup element such as an HTML tag.
    MarkupElement,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Function => write!(f, "function"),
            ScopeKind::Class => write!(f, "class"),
            ScopeKind::MarkupElement => write!(f, "element"),
        }
    }
}

/// A named lexical region enclosing some line.
///
/// `to_line` is the line holding the body-opening delimiter, so
/// `from_line..=to_line` is the scope's header, not its whole body.
///
/// # Examples
///
/// ```
/// use doctrack_core::{Scope, ScopeKind};
///
/// let scope = Scope {
///     kind: ScopeKind::Function,
///     name: "handler".into(),
///     from_line: 4,
///     to_line: 6,
/// };
/// assert_eq!(scope.header().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: String,
    pub from_line: usize,
    pub to_line: usize,
}

impl Scope {
    /// The header lines of the scope as a range.
    pub fn header(&self) -> LineRange {
        LineRange {
            from: self.from_line,
            to: self.to_line.max(self.from_line),
        }
    }
}

/// Ordered set of literal tag markers.
///
/// Matching is case-sensitive substring containment; there is no regex or
/// word-boundary handling, so `"# test"` also matches `"# testing"`.
///
/// # Examples
///
/// ```
/// use doctrack_core::TagMarkers;
///
/// let markers = TagMarkers::new(["# test", "#test"]).unwrap();
/// assert!(markers.matches("# test this block"));
/// assert!(markers.matches("# testing"));
/// assert!(!markers.matches("# TEST"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagMarkers(Vec<String>);

impl TagMarkers {
    /// Build a marker set.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Config`] if a marker is empty, since an empty
    /// marker would match every comment.
    pub fn new<I, S>(markers: I) -> Result<Self, DocTrackError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers.into_iter().map(Into::into).collect();
        if markers.iter().any(|m| m.is_empty()) {
            return Err(DocTrackError::Config("tag markers must not be empty".into()));
        }
        Ok(Self(markers))
    }

    /// Returns `true` if `text` contains at least one marker.
    pub fn matches(&self, text: &str) -> bool {
        self.0.iter().any(|marker| text.contains(marker.as_str()))
    }

    /// Markers in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for markers built through [`TagMarkers::new`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for TagMarkers {
    fn default() -> Self {
        Self(vec!["doc-track".to_string()])
    }
}

/// Output format for CLI results.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use doctrack_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colorized unified-diff listing.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown with fenced diff blocks.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn diff_side_converts_to_zero_based() {
        let range = LineRange::from_diff_side(25, 1).unwrap();
        assert_eq!((range.from(), range.to()), (24, 24));

        let range = LineRange::from_diff_side(10, 3).unwrap();
        assert_eq!((range.from(), range.to()), (9, 11));
    }

    #[test]
    fn zero_length_side_is_absent_not_line_zero() {
        assert_eq!(LineRange::from_diff_side(0, 0), None);
        assert_eq!(LineRange::from_diff_side(1, 1), Some(LineRange::single(0)));
    }

    #[test]
    fn hunks_deduplicate_by_value() {
        let a = Hunk::new(LineRange::new(1, 2), None);
        let b = Hunk::new(LineRange::new(1, 2), None);
        let c = Hunk::new(None, LineRange::new(1, 2));

        let set: HashSet<Hunk> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn hunk_display_uses_sentinel_for_absent_side() {
        let hunk = Hunk::new(LineRange::new(24, 24), None);
        assert_eq!(hunk.to_string(), "-(24,24) +(-1,-1)");
    }

    #[test]
    fn anchor_prefers_removed_side() {
        let hunk = Hunk::new(LineRange::new(7, 8), LineRange::new(3, 3));
        assert_eq!(hunk.anchor_line(), 7);
        let hunk = Hunk::new(None, LineRange::new(3, 3));
        assert_eq!(hunk.anchor_line(), 3);
    }

    #[test]
    fn scope_header_never_inverts() {
        let scope = Scope {
            kind: ScopeKind::Class,
            name: "A".into(),
            from_line: 4,
            to_line: 2,
        };
        assert_eq!(scope.header(), LineRange::single(4));
    }

    #[test]
    fn markers_reject_empty_strings() {
        assert!(TagMarkers::new(["doc", ""]).is_err());
        assert!(TagMarkers::new(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn markers_match_by_substring() {
        let markers = TagMarkers::new(["# test"]).unwrap();
        assert!(markers.matches("x = 1  # test"));
        assert!(!markers.matches("#test"));
        assert_eq!(markers.iter().collect::<Vec<_>>(), vec!["# test"]);
    }

    #[test]
    fn default_markers() {
        let markers = TagMarkers::default();
        assert_eq!(markers.len(), 1);
        assert!(markers.matches("// doc-track: keep README in sync"));
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "md".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }
}
