use std::fmt::Write;
use std::path::PathBuf;

use doctrack_core::Hunk;
use serde::Serialize;

use crate::engine::CheckOutcome;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const CYAN: &str = "\x1b[96m";

/// Tracked hunks ready for display.
///
/// # Examples
///
/// ```
/// use doctrack_check::{CheckOutcome, Report};
///
/// let report = Report::new(&CheckOutcome::default());
/// assert!(!report.tracked);
/// assert_eq!(report.render_text(false), "No documentation-tracked differences.\n");
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// `true` when at least one hunk is tracked.
    pub tracked: bool,
    pub files: Vec<ReportFile>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    pub path: PathBuf,
    pub hunks: Vec<ReportHunk>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHunk {
    #[serde(flatten)]
    pub hunk: Hunk,
    /// Raw diff text of the hunk, header included.
    #[serde(skip)]
    pub text: String,
}

impl Report {
    /// Collect the tracked hunks of `outcome`, ordered by path and then by
    /// first touched line.
    pub fn new(outcome: &CheckOutcome) -> Self {
        let mut files = Vec::new();
        for (path, tracked) in outcome.tracked.iter() {
            let texts = outcome.files.iter().find(|f| &f.path == path);
            let mut hunks: Vec<ReportHunk> = tracked
                .iter()
                .map(|hunk| ReportHunk {
                    hunk: *hunk,
                    text: texts
                        .and_then(|f| f.hunks.iter().find(|h| h.hunk == *hunk))
                        .map(|h| h.text.clone())
                        .unwrap_or_default(),
                })
                .collect();
            hunks.sort_by_key(|h| h.hunk.anchor_line());
            files.push(ReportFile {
                path: path.clone(),
                hunks,
            });
        }
        Self {
            tracked: !files.is_empty(),
            files,
        }
    }

    /// Diff-style text, optionally with ANSI colors.
    pub fn render_text(&self, color: bool) -> String {
        if !self.tracked {
            return "No documentation-tracked differences.\n".to_string();
        }

        let mut out = String::from("Differences affected by documentation:\n\n");
        for file in &self.files {
            let _ = writeln!(out, "+++ b/{}", file.path.display());
            for hunk in &file.hunks {
                if hunk.text.is_empty() {
                    let _ = writeln!(out, "{}", hunk.hunk);
                    continue;
                }
                for line in hunk.text.lines() {
                    let _ = writeln!(out, "{}", paint_line(line, color));
                }
            }
        }
        out
    }

    /// GitHub-flavored Markdown with one fenced diff block per file.
    ///
    /// # Examples
    ///
    /// ```
    /// use doctrack_check::{CheckOutcome, Report};
    ///
    /// let md = Report::new(&CheckOutcome::default()).to_markdown();
    /// assert!(md.contains("# Documentation Check"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Documentation Check\n\n");
        if !self.tracked {
            out.push_str("No documentation-tracked differences.\n");
            return out;
        }

        let total: usize = self.files.iter().map(|f| f.hunks.len()).sum();
        let _ = writeln!(
            out,
            "**Tracked hunks:** {total} in {} file(s)\n",
            self.files.len()
        );
        for file in &self.files {
            let _ = writeln!(out, "## `{}`\n", file.path.display());
            out.push_str("```diff\n");
            for hunk in &file.hunks {
                if hunk.text.is_empty() {
                    let _ = writeln!(out, "{}", hunk.hunk);
                } else {
                    out.push_str(&hunk.text);
                }
            }
            out.push_str("```\n\n");
        }
        out
    }
}

fn paint_line(line: &str, color: bool) -> String {
    if !color {
        return line.to_string();
    }
    if line.starts_with("@@") {
        let mut parts = line.splitn(3, "@@");
        let _ = parts.next();
        let range = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default();
        format!("{CYAN}@@{range}@@{RESET}{rest}")
    } else if line.starts_with('-') {
        format!("{RED}{line}{RESET}")
    } else if line.starts_with('+') {
        format!("{GREEN}{line}{RESET}")
    } else {
        line.to_string()
    }
}
