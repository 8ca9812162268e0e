//! Unified-diff parsing and hunk filtering.
//!
//! Turns zero-context `git diff` output into per-file line-range hunks and
//! drops the ones that never need a documentation check (excluded paths,
//! whitespace-only edits).
pub mod filter;
pub mod parser;
