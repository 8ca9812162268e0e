//! Line-level comment classification.
//!
//! Each line is parsed on its own with the file's grammar, so a marker that
//! only appears inside a string literal never counts: the comment node the
//! parser reports is the only text checked against the markers.

use doctrack_core::{DocTrackError, TagMarkers};
use tree_sitter::{Node, Parser};

use crate::language::Language;

/// The first comment found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComment {
    /// Source text of the comment node, delimiters included.
    pub text: String,
    /// `true` when the comment is the only thing on the line.
    pub standalone: bool,
}

/// Classifies single lines as tag lines, tagged lines, or neither.
///
/// # Examples
///
/// ```
/// use doctrack_core::TagMarkers;
/// use doctrack_syntax::{CommentClassifier, Language};
///
/// let markers = TagMarkers::new(["# comment"]).unwrap();
/// let mut classifier = CommentClassifier::new(Language::Python, markers).unwrap();
///
/// assert!(classifier.is_tag_line("# comment"));
/// assert!(!classifier.is_tag_line("print(22) # comment"));
/// assert!(classifier.is_tagged_line("print(22) # comment"));
/// assert!(!classifier.is_tagged_line("s = '# comment'"));
/// ```
pub struct CommentClassifier {
    language: Language,
    markers: TagMarkers,
    parser: Parser,
}

impl CommentClassifier {
    /// Create a classifier for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Parse`] if the grammar cannot be loaded.
    pub fn new(language: Language, markers: TagMarkers) -> Result<Self, DocTrackError> {
        Ok(Self {
            language,
            markers,
            parser: language.parser()?,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn markers(&self) -> &TagMarkers {
        &self.markers
    }

    /// Parse `line` in isolation and return its first comment, if any.
    ///
    /// Surrounding whitespace is trimmed first so indentation does not turn
    /// into a syntax error in indentation-sensitive grammars.
    pub fn classify(&mut self, line: &str) -> Option<LineComment> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let tree = self.parser.parse(line, None)?;
        let root = tree.root_node();
        let comment = find_first_comment(root, self.language)?;
        let standalone = root.child_count() == 1
            && root
                .child(0)
                .is_some_and(|child| self.language.is_comment_kind(child.kind()));

        Some(LineComment {
            text: comment.utf8_text(line.as_bytes()).unwrap_or_default().to_string(),
            standalone,
        })
    }

    /// `true` if the line holds nothing but a comment.
    pub fn is_comment_line(&mut self, line: &str) -> bool {
        self.classify(line).is_some_and(|c| c.standalone)
    }

    /// `true` if the line is a standalone comment containing a marker.
    pub fn is_tag_line(&mut self, line: &str) -> bool {
        match self.classify(line) {
            Some(comment) => comment.standalone && self.markers.matches(&comment.text),
            None => false,
        }
    }

    /// `true` if the first comment on the line, standalone or trailing,
    /// contains a marker.
    pub fn is_tagged_line(&mut self, line: &str) -> bool {
        match self.classify(line) {
            Some(comment) => self.markers.matches(&comment.text),
            None => false,
        }
    }
}

/// Depth-first, leftmost-first search for a comment node.
pub fn find_first_comment(node: Node<'_>, language: Language) -> Option<Node<'_>> {
    if language.is_comment_kind(node.kind()) {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| find_first_comment(child, language))
}
