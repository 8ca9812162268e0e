//! Resolve the named scopes enclosing a line.
//!
//! A line belongs to a node when the node covers the line's last column, so
//! a line that opens a scope resolves inside that scope. Parsing is
//! error-tolerant: malformed source yields whatever named nodes tree-sitter
//! recovers, possibly none.

use std::ops::Range;

use doctrack_core::{DocTrackError, Scope};
use tree_sitter::{Node, Parser, Tree};

use crate::language::{BodyDelimiter, Language, NameSource, ScopeRule};

/// Parses full file images for one language.
pub struct ScopeResolver {
    language: Language,
    parser: Parser,
}

impl ScopeResolver {
    /// # Errors
    ///
    /// Returns [`DocTrackError::Parse`] if the grammar cannot be loaded.
    pub fn new(language: Language) -> Result<Self, DocTrackError> {
        Ok(Self {
            language,
            parser: language.parser()?,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Parse a complete file image.
    pub fn parse(&mut self, source: impl Into<String>) -> SyntaxTree {
        let source = source.into();
        let tree = self.parser.parse(&source, None);
        if tree.is_none() {
            tracing::debug!(language = %self.language, "parser returned no tree");
        }
        SyntaxTree::new(self.language, source, tree)
    }
}

/// A parsed file image with line access and scope lookup.
pub struct SyntaxTree {
    language: Language,
    source: String,
    tree: Option<Tree>,
    lines: Vec<Range<usize>>,
}

impl SyntaxTree {
    fn new(language: Language, source: String, tree: Option<Tree>) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for raw in source.split_inclusive('\n') {
            let body = raw.trim_end_matches('\n').trim_end_matches('\r');
            lines.push(start..start + body.len());
            start += raw.len();
        }
        Self {
            language,
            source,
            tree,
            lines,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Number of lines in the image, not counting a trailing newline.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of line `index` without its line terminator.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines
            .get(index)
            .map(|span| &self.source[span.clone()])
    }

    /// Scopes enclosing `line`, outermost first.
    ///
    /// # Examples
    ///
    /// ```
    /// use doctrack_core::ScopeKind;
    /// use doctrack_syntax::{Language, ScopeResolver};
    ///
    /// let mut resolver = ScopeResolver::new(Language::Python).unwrap();
    /// let tree = resolver.parse("def f():\n    x=1\n");
    /// let chain = tree.scope_chain(1);
    /// assert_eq!(chain.len(), 1);
    /// assert_eq!(chain[0].kind, ScopeKind::Function);
    /// assert_eq!(chain[0].name, "f");
    /// assert_eq!((chain[0].from_line, chain[0].to_line), (0, 0));
    /// ```
    pub fn scope_chain(&self, line: usize) -> Vec<Scope> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };

        let mut chain: Vec<Scope> = Vec::new();
        let mut node = tree.root_node();
        loop {
            if let Some(rule) = self.language.scope_rule(node.kind()) {
                match self.build_scope(node, rule) {
                    Some(scope) if !chain.contains(&scope) => chain.push(scope),
                    Some(_) => {}
                    None => tracing::trace!(kind = node.kind(), "scope node without a name"),
                }
            }
            match innermost_child_on_line(node, line) {
                Some(child) => node = child,
                None => break,
            }
        }
        chain
    }

    fn build_scope(&self, node: Node<'_>, rule: &ScopeRule) -> Option<Scope> {
        let name = scope_name(node, rule.name, self.source.as_bytes())?;
        let from_line = node.start_position().row;
        let to_line = body_line(node, rule.body).unwrap_or(from_line);
        Some(Scope {
            kind: rule.kind,
            name,
            from_line,
            to_line,
        })
    }
}

/// Parse `source` and resolve the scope chain at `line`.
///
/// # Errors
///
/// Returns [`DocTrackError::Parse`] if the grammar cannot be loaded. Malformed
/// source is not an error.
///
/// # Examples
///
/// ```
/// use doctrack_syntax::{resolve_scopes, Language};
///
/// let chain = resolve_scopes("x = 1\n", 0, Language::Python).unwrap();
/// assert!(chain.is_empty());
/// ```
pub fn resolve_scopes(
    source: &str,
    line: usize,
    language: Language,
) -> Result<Vec<Scope>, DocTrackError> {
    let mut resolver = ScopeResolver::new(language)?;
    Ok(resolver.parse(source).scope_chain(line))
}

/// `true` if `node` covers the end of `line`.
fn covers_line(node: &Node<'_>, line: usize) -> bool {
    let start = node.start_position();
    let end = node.end_position();
    start.row <= line
        && node.end_byte() > node.start_byte()
        && (end.row > line || (end.row == line && end.column > 0))
}

/// The last named child covering `line`; later siblings start further right.
fn innermost_child_on_line<'tree>(node: Node<'tree>, line: usize) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let mut found = None;
    for child in node.named_children(&mut cursor) {
        if child.start_position().row > line {
            break;
        }
        if covers_line(&child, line) {
            found = Some(child);
        }
    }
    found
}

fn scope_name(node: Node<'_>, source: NameSource, text: &[u8]) -> Option<String> {
    let name_node = match source {
        NameSource::Field(field) => node.child_by_field_name(field),
        NameSource::Declarator => declarator_name(node),
        NameSource::StartTag => start_tag_name(node),
    }?;
    let name = node_text(&name_node, text);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Follow `declarator` fields down to the innermost named node.
fn declarator_name(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.child_by_field_name("declarator")?;
    while let Some(inner) = current.child_by_field_name("declarator") {
        current = inner;
    }
    Some(current)
}

fn start_tag_name(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let tag = node
        .children(&mut cursor)
        .find(|child| matches!(child.kind(), "start_tag" | "self_closing_tag"))?;
    let mut cursor = tag.walk();
    let name = tag
        .children(&mut cursor)
        .find(|child| child.kind() == "tag_name");
    name
}

fn body_line(node: Node<'_>, delimiter: BodyDelimiter) -> Option<usize> {
    match delimiter {
        BodyDelimiter::Token(kind) => {
            let mut cursor = node.walk();
            let token = node.children(&mut cursor).find(|child| child.kind() == kind);
            token.map(|t| t.end_position().row)
        }
        BodyDelimiter::Field(field) => node
            .child_by_field_name(field)
            .map(|body| body.start_position().row),
        BodyDelimiter::NodeEnd => Some(node.end_position().row),
    }
}

fn node_text(node: &Node<'_>, source: &[u8]) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    if start >= source.len() || end > source.len() {
        return String::new();
    }
    String::from_utf8_lossy(&source[start..end]).to_string()
}
