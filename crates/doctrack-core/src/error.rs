use std::path::PathBuf;

/// Errors that can occur across doctrack.
///
/// Library crates use this type directly; the binary converts to
/// `miette` reports at the boundary.
///
/// # Examples
///
/// ```
/// use doctrack_core::DocTrackError;
///
/// let err = DocTrackError::Config("empty tag marker".into());
/// assert!(err.to_string().contains("empty tag marker"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DocTrackError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git operation failure.
    #[diagnostic(help("run inside a git repository or pass --repo"))]
    #[error("git error: {0}")]
    Git(String),

    /// A grammar could not be loaded into the parser.
    #[error("parse error: {0}")]
    Parse(String),

    /// A `@@` line that does not carry a valid range pair.
    ///
    /// The hunk parser recovers from this by skipping the line.
    #[error("malformed hunk header: {0}")]
    MalformedHunkHeader(String),

    /// A pre-image or post-image could not be retrieved.
    #[diagnostic(help("the file must exist at the compared revisions; see --version-from and --version-to"))]
    #[error(
        "content unavailable for {} at {}: {reason}",
        .path.display(),
        .version.as_deref().unwrap_or("working tree")
    )]
    MissingContent {
        /// File whose content was requested.
        path: PathBuf,
        /// Revision requested, `None` for the working tree.
        version: Option<String>,
        /// Underlying cause.
        reason: String,
    },

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
