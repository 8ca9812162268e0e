use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use doctrack_core::{DocTrackConfig, DocTrackError, ScopeKind};

/// Where a scope node keeps its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// A named field on the scope node (`name`, `type`).
    Field(&'static str),
    /// Follow nested `declarator` fields down to the identifier (C family).
    Declarator,
    /// The `tag_name` inside the element's start tag (markup).
    StartTag,
}

/// How the line of a scope's body-opening delimiter is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDelimiter {
    /// First direct child token of this kind, e.g. Python's trailing `:`.
    Token(&'static str),
    /// Start of the named body field, e.g. the `{` of a block.
    Field(&'static str),
    /// The node's own last line; markup elements have no separate body.
    NodeEnd,
}

/// One tree-sitter node kind recognized as a named scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRule {
    pub node_kind: &'static str,
    pub kind: ScopeKind,
    pub name: NameSource,
    pub body: BodyDelimiter,
}

const fn rule(
    node_kind: &'static str,
    kind: ScopeKind,
    name: NameSource,
    body: BodyDelimiter,
) -> ScopeRule {
    ScopeRule {
        node_kind,
        kind,
        name,
        body,
    }
}

const NAME: NameSource = NameSource::Field("name");
const BODY: BodyDelimiter = BodyDelimiter::Field("body");

const PYTHON_SCOPES: &[ScopeRule] = &[
    rule("function_definition", ScopeKind::Function, NAME, BodyDelimiter::Token(":")),
    rule("class_definition", ScopeKind::Class, NAME, BodyDelimiter::Token(":")),
];

const JAVASCRIPT_SCOPES: &[ScopeRule] = &[
    rule("function_declaration", ScopeKind::Function, NAME, BODY),
    rule("generator_function_declaration", ScopeKind::Function, NAME, BODY),
    rule("method_definition", ScopeKind::Function, NAME, BODY),
    rule("class_declaration", ScopeKind::Class, NAME, BODY),
];

const TYPESCRIPT_SCOPES: &[ScopeRule] = &[
    rule("function_declaration", ScopeKind::Function, NAME, BODY),
    rule("generator_function_declaration", ScopeKind::Function, NAME, BODY),
    rule("method_definition", ScopeKind::Function, NAME, BODY),
    rule("class_declaration", ScopeKind::Class, NAME, BODY),
    rule("abstract_class_declaration", ScopeKind::Class, NAME, BODY),
    rule("interface_declaration", ScopeKind::Class, NAME, BODY),
];

const RUST_SCOPES: &[ScopeRule] = &[
    rule("function_item", ScopeKind::Function, NAME, BODY),
    rule("struct_item", ScopeKind::Class, NAME, BODY),
    rule("enum_item", ScopeKind::Class, NAME, BODY),
    rule("trait_item", ScopeKind::Class, NAME, BODY),
    rule("mod_item", ScopeKind::Class, NAME, BODY),
    rule("impl_item", ScopeKind::Class, NameSource::Field("type"), BODY),
];

const GO_SCOPES: &[ScopeRule] = &[
    rule("function_declaration", ScopeKind::Function, NAME, BODY),
    rule("method_declaration", ScopeKind::Function, NAME, BODY),
];

const JAVA_SCOPES: &[ScopeRule] = &[
    rule("class_declaration", ScopeKind::Class, NAME, BODY),
    rule("interface_declaration", ScopeKind::Class, NAME, BODY),
    rule("enum_declaration", ScopeKind::Class, NAME, BODY),
    rule("method_declaration", ScopeKind::Function, NAME, BODY),
    rule("constructor_declaration", ScopeKind::Function, NAME, BODY),
];

const C_SCOPES: &[ScopeRule] = &[
    rule("function_definition", ScopeKind::Function, NameSource::Declarator, BODY),
    rule("struct_specifier", ScopeKind::Class, NAME, BODY),
];

const CPP_SCOPES: &[ScopeRule] = &[
    rule("function_definition", ScopeKind::Function, NameSource::Declarator, BODY),
    rule("struct_specifier", ScopeKind::Class, NAME, BODY),
    rule("class_specifier", ScopeKind::Class, NAME, BODY),
    rule("namespace_definition", ScopeKind::Class, NAME, BODY),
];

const HTML_SCOPES: &[ScopeRule] = &[rule(
    "element",
    ScopeKind::MarkupElement,
    NameSource::StartTag,
    BodyDelimiter::NodeEnd,
)];

/// A supported source language and its grammar adapter.
///
/// # Examples
///
/// ```
/// use doctrack_syntax::Language;
///
/// assert_eq!(Language::from_extension("py"), Some(Language::Python));
/// assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
/// assert_eq!(Language::from_extension("htm"), Some(Language::Html));
/// assert_eq!(Language::from_extension("txt"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    Html,
}

impl Language {
    /// Detect language from a file extension string (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" | "pyi" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "rs" => Some(Language::Rust),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Some(Language::Cpp),
            "html" | "htm" => Some(Language::Html),
            _ => None,
        }
    }

    /// Get the tree-sitter grammar for this language.
    pub fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::C => tree_sitter_c::LANGUAGE.into(),
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Language::Html => tree_sitter_html::LANGUAGE.into(),
        }
    }

    /// A parser already set up with this language's grammar.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Parse`] if the grammar ABI is incompatible
    /// with the linked tree-sitter runtime.
    pub fn parser(&self) -> Result<tree_sitter::Parser, DocTrackError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.tree_sitter_language())
            .map_err(|e| DocTrackError::Parse(format!("failed to set language {self}: {e}")))?;
        Ok(parser)
    }

    /// Scope node kinds recognized for this language.
    pub fn scope_rules(&self) -> &'static [ScopeRule] {
        match self {
            Language::Python => PYTHON_SCOPES,
            Language::JavaScript => JAVASCRIPT_SCOPES,
            Language::TypeScript => TYPESCRIPT_SCOPES,
            Language::Rust => RUST_SCOPES,
            Language::Go => GO_SCOPES,
            Language::Java => JAVA_SCOPES,
            Language::C => C_SCOPES,
            Language::Cpp => CPP_SCOPES,
            Language::Html => HTML_SCOPES,
        }
    }

    /// Rule for `node_kind`, if that kind is a scope in this language.
    pub fn scope_rule(&self, node_kind: &str) -> Option<&'static ScopeRule> {
        self.scope_rules()
            .iter()
            .find(|rule| rule.node_kind == node_kind)
    }

    /// Node kinds the grammar emits for comments.
    pub fn comment_kinds(&self) -> &'static [&'static str] {
        match self {
            Language::Rust | Language::Java => &["line_comment", "block_comment"],
            _ => &["comment"],
        }
    }

    pub fn is_comment_kind(&self, node_kind: &str) -> bool {
        self.comment_kinds().contains(&node_kind)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Html => "html",
        };
        f.write_str(name)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "rust" | "rs" => Ok(Language::Rust),
            "go" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            "html" => Ok(Language::Html),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// Extension-based language detection with configured overrides.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use doctrack_core::DocTrackConfig;
/// use doctrack_syntax::{Language, LanguageMap};
///
/// let config = DocTrackConfig::from_toml("[languages]\nvue = \"html\"").unwrap();
/// let map = LanguageMap::from_config(&config).unwrap();
/// assert_eq!(map.detect(Path::new("ui/App.vue")), Some(Language::Html));
/// assert_eq!(map.detect(Path::new("main.py")), Some(Language::Python));
/// assert_eq!(map.detect(Path::new("README")), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LanguageMap {
    overrides: BTreeMap<String, Language>,
}

impl LanguageMap {
    /// Build the map from the `[languages]` table.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Config`] for an unknown language name.
    pub fn from_config(config: &DocTrackConfig) -> Result<Self, DocTrackError> {
        let mut overrides = BTreeMap::new();
        for (ext, name) in &config.languages {
            let language = name
                .parse::<Language>()
                .map_err(|e| DocTrackError::Config(format!("[languages] {ext}: {e}")))?;
            overrides.insert(ext.trim_start_matches('.').to_string(), language);
        }
        Ok(Self { overrides })
    }

    /// Language for `path`, checking overrides before built-in extensions.
    pub fn detect(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        self.overrides
            .get(ext)
            .copied()
            .or_else(|| Language::from_extension(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Language; 9] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Rust,
        Language::Go,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::Html,
    ];

    #[test]
    fn every_grammar_loads() {
        for language in ALL {
            assert!(language.parser().is_ok(), "grammar for {language} failed to load");
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for language in ALL {
            assert_eq!(language.to_string().parse::<Language>().unwrap(), language);
        }
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn scope_rules_are_found_by_node_kind() {
        let rule = Language::Python.scope_rule("class_definition").unwrap();
        assert_eq!(rule.kind, ScopeKind::Class);
        assert_eq!(rule.body, BodyDelimiter::Token(":"));
        assert!(Language::Python.scope_rule("if_statement").is_none());

        let rule = Language::Rust.scope_rule("impl_item").unwrap();
        assert_eq!(rule.name, NameSource::Field("type"));
    }

    #[test]
    fn comment_kinds_per_grammar() {
        assert!(Language::Python.is_comment_kind("comment"));
        assert!(Language::Rust.is_comment_kind("line_comment"));
        assert!(!Language::Rust.is_comment_kind("comment"));
        assert!(Language::Java.is_comment_kind("block_comment"));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = DocTrackConfig::from_toml("[languages]\nh = \"cpp\"\n\".tpl\" = \"html\"").unwrap();
        let map = LanguageMap::from_config(&config).unwrap();
        assert_eq!(map.detect(Path::new("include/x.h")), Some(Language::Cpp));
        assert_eq!(map.detect(Path::new("page.tpl")), Some(Language::Html));
        assert_eq!(map.detect(Path::new("main.c")), Some(Language::C));
    }

    #[test]
    fn unknown_override_language_is_a_config_error() {
        let config = DocTrackConfig::from_toml("[languages]\nx = \"klingon\"").unwrap();
        let err = LanguageMap::from_config(&config).unwrap_err();
        assert!(matches!(err, DocTrackError::Config(_)));
    }
}
