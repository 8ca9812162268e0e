//! Decide which diff hunks touch documentation-tracked code.
//!
//! - [`source`]: where diff text and file images come from
//! - [`engine`]: the per-hunk decision procedure
//! - [`tracked`]: per-file sets of tracked hunks
//! - [`report`]: text, JSON and Markdown rendering

pub mod engine;
pub mod report;
pub mod source;
pub mod tracked;

pub use engine::{resolve_tracked_differences, CheckOutcome, Checker};
pub use report::Report;
pub use source::{ContentSource, DiffSource, MemoryContent, StaticDiff};
pub use tracked::TrackedDifferences;
