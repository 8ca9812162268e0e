use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DocTrackError;
use crate::types::TagMarkers;

/// File name looked up in the current directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".doctrack.toml";

/// Top-level configuration loaded from `.doctrack.toml`.
///
/// Supports layered resolution: CLI flags > config file > defaults.
///
/// # Examples
///
/// ```
/// use doctrack_core::DocTrackConfig;
///
/// let config = DocTrackConfig::default();
/// assert_eq!(config.tags, vec!["doc-track".to_string()]);
/// assert_eq!(config.fail_status, 1);
/// assert!(config.skip_blank_lines);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTrackConfig {
    /// Literal markers that flag a comment as a documentation tag.
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    /// Exit status used when tracked differences are found (default: 1).
    #[serde(default = "default_fail_status")]
    pub fail_status: i32,
    /// Ignore hunks whose changed lines are all blank (default: true).
    #[serde(default = "default_skip_blank_lines")]
    pub skip_blank_lines: bool,
    /// Glob patterns of paths that are never checked.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Extension to language overrides, e.g. `pyi = "python"`.
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
}

fn default_tags() -> Vec<String> {
    vec!["doc-track".into()]
}

fn default_fail_status() -> i32 {
    1
}

fn default_skip_blank_lines() -> bool {
    true
}

impl Default for DocTrackConfig {
    fn default() -> Self {
        Self {
            tags: default_tags(),
            fail_status: default_fail_status(),
            skip_blank_lines: default_skip_blank_lines(),
            exclude: Vec::new(),
            languages: BTreeMap::new(),
        }
    }
}

impl DocTrackConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Io`] if the file cannot be read, or
    /// [`DocTrackError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use doctrack_core::DocTrackConfig;
    /// use std::path::Path;
    ///
    /// let config = DocTrackConfig::from_file(Path::new(".doctrack.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, DocTrackError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use doctrack_core::DocTrackConfig;
    ///
    /// let toml = r##"
    /// tags = ["# doc", "// doc"]
    /// fail_status = 3
    /// "##;
    /// let config = DocTrackConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.tags.len(), 2);
    /// assert_eq!(config.fail_status, 3);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, DocTrackError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Validated tag markers.
    ///
    /// # Errors
    ///
    /// Returns [`DocTrackError::Config`] if a configured tag is empty.
    pub fn markers(&self) -> Result<TagMarkers, DocTrackError> {
        TagMarkers::new(self.tags.iter().cloned())
    }
}
