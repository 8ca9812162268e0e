//! Tree-sitter backed source inspection.
//!
//! Three pieces, all pure functions of their input text:
//! - [`language`]: grammar adapters: which node kinds are scopes, where a
//!   scope's name and body delimiter live, which node kinds are comments
//! - [`comments`]: classify a single line as a tag line, a tagged line, or
//!   neither
//! - [`scope`]: resolve the chain of named scopes enclosing a line

pub mod comments;
pub mod language;
pub mod scope;

pub use comments::{CommentClassifier, LineComment};
pub use language::{BodyDelimiter, Language, LanguageMap, NameSource, ScopeRule};
pub use scope::{resolve_scopes, ScopeResolver, SyntaxTree};
