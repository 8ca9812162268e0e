use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use doctrack_core::{DocTrackError, Hunk, LineRange};

/// A single hunk together with the raw text it was parsed from.
///
/// The text (header plus body lines) is kept for display only; it takes no
/// part in [`Hunk`] equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// Line ranges touched by the hunk.
    pub hunk: Hunk,
    /// The `@@` header line followed by the `+`/`-`/context body lines.
    pub text: String,
}

impl DiffHunk {
    /// Content of the `+` and `-` lines, without their prefix.
    pub fn changed_lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .lines()
            .skip(1)
            .filter_map(|line| line.strip_prefix('+').or_else(|| line.strip_prefix('-')))
    }

    /// Returns `true` when every changed line is empty or whitespace.
    pub fn is_blank_only(&self) -> bool {
        self.changed_lines().all(|line| line.trim().is_empty())
    }
}

/// All hunks of one file, in diff order.
///
/// # Examples
///
/// ```
/// use doctrack_difflens::parser::parse_unified_diff;
///
/// let diff = "diff --git a/hello.py b/hello.py\n\
///             --- a/hello.py\n\
///             +++ b/hello.py\n\
///             @@ -1 +1,2 @@\n\
///             -print('hi')\n\
///             +print('hello')\n\
///             +print('world')\n";
/// let files = parse_unified_diff(diff);
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].hunks.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path in the new version, relative to the repository root.
    pub path: PathBuf,
    /// Parsed hunks for this file.
    pub hunks: Vec<DiffHunk>,
}

impl fmt::Display for FileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} hunks)", self.path.display(), self.hunks.len())
    }
}

/// Body lines still expected for the hunk being read.
struct OpenHunk {
    old_left: usize,
    new_left: usize,
}

impl OpenHunk {
    fn is_done(&self) -> bool {
        self.old_left == 0 && self.new_left == 0
    }
}

/// Parse zero-context unified diff text (as produced by `git diff -U0`) into
/// per-file hunks.
///
/// Only `diff --git`, `+++ b/<path>`, and `@@` lines drive the parse. A
/// `diff --git` line unsets the current file; `+++ b/` selects it. Hunk
/// headers seen with no current file (deleted files, `+++ /dev/null`) are
/// ignored, and malformed headers are skipped without aborting.
///
/// # Examples
///
/// ```
/// use doctrack_core::LineRange;
/// use doctrack_difflens::parser::parse_unified_diff;
///
/// let files = parse_unified_diff("diff --git a/a.py b/a.py\n+++ b/a.py\n@@ -0,0 +1,3 @@\n+a\n+b\n+c\n");
/// let hunk = files[0].hunks[0].hunk;
/// assert_eq!(hunk.removed, None);
/// assert_eq!(hunk.added, LineRange::new(0, 2));
/// ```
pub fn parse_unified_diff(input: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current: Option<usize> = None;
    let mut open: Option<OpenHunk> = None;

    for line in input.lines() {
        if let Some(body) = open.as_mut() {
            let consumed = match line.as_bytes().first() {
                Some(b'-') => {
                    body.old_left = body.old_left.saturating_sub(1);
                    true
                }
                Some(b'+') => {
                    body.new_left = body.new_left.saturating_sub(1);
                    true
                }
                Some(b' ') => {
                    body.old_left = body.old_left.saturating_sub(1);
                    body.new_left = body.new_left.saturating_sub(1);
                    true
                }
                _ => false,
            };
            if consumed {
                if let Some(last) = current.and_then(|idx| files[idx].hunks.last_mut()) {
                    last.text.push_str(line);
                    last.text.push('\n');
                }
                if body.is_done() {
                    open = None;
                }
                continue;
            }
            if line.starts_with('\\') {
                continue;
            }
            open = None;
        }

        if line.starts_with("diff --git") {
            current = None;
            continue;
        }

        if let Some(path) = line.strip_prefix("+++ b/") {
            let path = PathBuf::from(path.trim_end());
            let idx = match files.iter().position(|f| f.path == path) {
                Some(idx) => {
                    files[idx].hunks.clear();
                    idx
                }
                None => {
                    files.push(FileDiff {
                        path,
                        hunks: Vec::new(),
                    });
                    files.len() - 1
                }
            };
            current = Some(idx);
            continue;
        }

        if line.starts_with("@@") {
            let Some(idx) = current else {
                continue;
            };
            match parse_hunk_header(line) {
                Ok((old_start, old_lines, new_start, new_lines)) => {
                    files[idx].hunks.push(DiffHunk {
                        hunk: Hunk::new(
                            LineRange::from_diff_side(old_start, old_lines),
                            LineRange::from_diff_side(new_start, new_lines),
                        ),
                        text: format!("{line}\n"),
                    });
                    let body = OpenHunk {
                        old_left: old_lines,
                        new_left: new_lines,
                    };
                    if !body.is_done() {
                        open = Some(body);
                    }
                }
                Err(e) => tracing::debug!("skipping line: {e}"),
            }
        }
    }

    files
}

/// Group parsed hunks by file path, keeping diff order within each file.
///
/// # Examples
///
/// ```
/// use doctrack_difflens::parser::{hunks_by_file, parse_unified_diff};
///
/// let files = parse_unified_diff("+++ b/x.py\n@@ -3 +3 @@\n-a\n+b\n");
/// let map = hunks_by_file(&files);
/// assert_eq!(map.len(), 1);
/// ```
pub fn hunks_by_file(files: &[FileDiff]) -> BTreeMap<PathBuf, Vec<Hunk>> {
    files
        .iter()
        .map(|file| {
            (
                file.path.clone(),
                file.hunks.iter().map(|h| h.hunk).collect(),
            )
        })
        .collect()
}

fn parse_hunk_header(line: &str) -> Result<(usize, usize, usize, usize), DocTrackError> {
    let malformed = || DocTrackError::MalformedHunkHeader(line.to_string());

    let inner = line.trim_start_matches('@').trim_start();
    let mut parts = inner.split_whitespace();
    let old = parts
        .next()
        .and_then(|p| p.strip_prefix('-'))
        .ok_or_else(malformed)?;
    let new = parts
        .next()
        .and_then(|p| p.strip_prefix('+'))
        .ok_or_else(malformed)?;

    let (old_start, old_lines) = parse_range(old).ok_or_else(malformed)?;
    let (new_start, new_lines) = parse_range(new).ok_or_else(malformed)?;

    Ok((old_start, old_lines, new_start, new_lines))
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    let (start, count): (usize, usize) = match range.split_once(',') {
        Some((start, count)) => (start.parse().ok()?, count.parse().ok()?),
        None => (range.parse().ok()?, 1),
    };
    // The last line must be addressable.
    if count > 0 {
        start.saturating_sub(1).checked_add(count - 1)?;
    }
    Some((start, count))
}
