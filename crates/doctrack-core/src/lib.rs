//! Core types, configuration, and error handling for doctrack.
//!
//! This crate provides the shared foundation used by all other doctrack crates:
//! - [`DocTrackError`]: unified error type using `thiserror`
//! - [`DocTrackConfig`]: configuration loaded from `.doctrack.toml`
//! - Shared types: [`LineRange`], [`Hunk`], [`Scope`], [`ScopeKind`],
//!   [`TagMarkers`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{DocTrackConfig, DEFAULT_CONFIG_FILE};
pub use error::DocTrackError;
pub use types::{Hunk, LineRange, OutputFormat, Scope, ScopeKind, TagMarkers};

/// A convenience `Result` type for doctrack operations.
pub type Result<T> = std::result::Result<T, DocTrackError>;
