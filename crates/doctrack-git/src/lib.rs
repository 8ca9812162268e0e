//! Git-backed diff and content sources via git2.
//!
//! [`GitRepository`] produces zero-context patch text between two revisions
//! (or a revision and the working tree) and reads file images at any
//! revision, so the check engine never shells out to `git`.

pub mod repository;

pub use repository::GitRepository;
