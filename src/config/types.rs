//! Configuration type definitions.
//!
//! This module contains all the data structures used in coursebook configuration files.
//! These types are pure data - no I/O or complex logic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// =============================================================================
// Root config
// =============================================================================

/// Root configuration - everything needed to build the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    /// Globs matching layout and partial templates, relative to the config file
    #[serde(default = "default_templates")]
    pub templates: Vec<String>,
    #[serde(default)]
    pub lessons: LessonsConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    /// Development-specific settings (watch mode, etc.)
    #[serde(default)]
    pub dev: DevConfig,
}

fn default_templates() -> Vec<String> {
    vec!["layouts/*.html".to_string()]
}

// =============================================================================
// Site configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: Option<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("build")
}

// =============================================================================
// Content configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory holding the markdown documents
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,
    /// Glob (relative to `dir`) selecting the documents to build
    #[serde(default = "default_content_pattern")]
    pub pattern: String,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_content_pattern() -> String {
    "**/*.md".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            pattern: default_content_pattern(),
        }
    }
}

// =============================================================================
// Lessons configuration
// =============================================================================

/// The curriculum: which layout marks a lesson, and the order lessons appear in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonsConfig {
    #[serde(default = "default_lesson_layout")]
    pub layout: String,
    /// Lesson slugs in curriculum order
    #[serde(default)]
    pub order: Vec<String>,
}

fn default_lesson_layout() -> String {
    "lesson".to_string()
}

impl Default for LessonsConfig {
    fn default() -> Self {
        Self {
            layout: default_lesson_layout(),
            order: Vec::new(),
        }
    }
}

// =============================================================================
// Asset configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Stylesheet globs, in link order
    #[serde(default)]
    pub css: Vec<String>,
    /// Script globs, in load order
    #[serde(default)]
    pub js: Vec<String>,
    /// Directory copied verbatim into the output
    #[serde(default, rename = "static")]
    pub static_dir: Option<PathBuf>,
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "definition_lists".to_string(),
        "footnotes".to_string(),
        "gfm".to_string(),
        "heading_attributes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
        }
    }
}

// =============================================================================
// Highlight configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Theme used when generating highlight CSS
    #[serde(default = "default_highlight_theme")]
    pub theme: String,
}

fn default_highlight_theme() -> String {
    "github-dark".to_string()
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: default_highlight_theme(),
        }
    }
}

// =============================================================================
// Development configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    /// File watching configuration
    #[serde(default)]
    pub watch: WatchConfig,
    /// Enable live reload in the browser when files change (default: true)
    #[serde(default = "default_live_reload")]
    pub live_reload: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            live_reload: true,
        }
    }
}

fn default_live_reload() -> bool {
    true
}

/// Configuration for file watching during development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems, Docker volumes, or other situations
    /// where native events are unreliable.
    #[serde(default)]
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Debounce timeout in milliseconds.
    /// Changes within this window are batched together.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

// =============================================================================
// Path helpers
// =============================================================================

/// Resolve a possibly-relative path against the project base path.
pub fn resolve_path(base_path: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_path.join(path)
    } else {
        path.to_path_buf()
    }
}

impl Config {
    /// The output directory, resolved against `base_path`.
    pub fn output_dir(&self, base_path: &Path) -> PathBuf {
        resolve_path(base_path, &self.site.output)
    }

    /// The content root, resolved against `base_path`.
    pub fn content_dir(&self, base_path: &Path) -> PathBuf {
        resolve_path(base_path, &self.content.dir)
    }
}
