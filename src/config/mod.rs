//! Configuration loading and types for coursebook.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)

mod load;
mod types;

use std::collections::HashSet;
use std::path::PathBuf;

// Re-export all types for convenient access
pub use types::{
    AssetsConfig, Config, ContentConfig, DevConfig, HighlightConfig, LessonsConfig,
    MarkdownConfig, SiteConfig, WatchConfig, resolve_path,
};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "coursebook.yaml";

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to encode config file path as a unicode string: {0}")]
    EncodePath(PathBuf),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("{0}")]
    Validation(String),

    #[error("content directory does not exist: {0}")]
    ContentDirNotFound(PathBuf),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("glob '{0}' did not match any files")]
    EmptyGlob(String),

    #[error("{path} is not inside the content directory {root}")]
    OutsideContentRoot { path: PathBuf, root: PathBuf },
}

impl Config {
    /// Check invariants that serde can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'site.name' must not be empty".to_string(),
            ));
        }

        if self.templates.is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: at least one 'templates' glob is required\n\nExample:\n  templates:\n    - layouts/*.html".to_string(),
            ));
        }

        if self.lessons.layout.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'lessons.layout' must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for slug in &self.lessons.order {
            if !seen.insert(slug.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "invalid config: lesson '{slug}' appears more than once in 'lessons.order'"
                )));
            }
        }

        Ok(())
    }
}
