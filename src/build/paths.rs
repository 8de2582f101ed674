//! Path and URL conversion utilities.
//!
//! This module handles conversions between:
//! - Source file paths (markdown files under the content root)
//! - Page identifiers (slug, content-relative URL, root path)
//! - Output file paths (where pages are written in the output directory)

use std::path::{Component, Path, PathBuf};

use crate::config::ConfigError;

/// Identifiers derived from a document's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Filename without extension
    pub slug: String,
    /// Path relative to the content root, extension stripped, `/`-separated
    pub url: String,
    /// Relative prefix from the page back to the site root
    pub root_path: String,
}

/// Derive slug, URL and root path for a document.
///
/// # Examples
/// ```ignore
/// locate("/site/content/intro.md", "/site/content", false)
///     => { slug: "intro", url: "intro", root_path: "" }
/// locate("/site/content/lessons/flexbox.md", "/site/content", false)
///     => { slug: "flexbox", url: "lessons/flexbox", root_path: "../" }
/// locate("/site/content/errors/404.md", "/site/content", true)
///     => { slug: "404", url: "errors/404", root_path: "/" }
/// ```
pub fn locate(path: &Path, content_root: &Path, is_404: bool) -> Result<PageLocation, ConfigError> {
    let relative = path
        .strip_prefix(content_root)
        .map_err(|_| ConfigError::OutsideContentRoot {
            path: path.to_path_buf(),
            root: content_root.to_path_buf(),
        })?;

    let url = source_path_to_url(relative);
    let root_path = if is_404 {
        // The not-found page is served from arbitrary depths
        "/".to_string()
    } else {
        root_path_for(&url)
    };

    Ok(PageLocation {
        slug: slug_for(path),
        url,
        root_path,
    })
}

/// The filename without its extension.
pub fn slug_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert a content-relative markdown path to a URL path.
///
/// # Examples
/// ```ignore
/// source_path_to_url("installation.md") => "installation"
/// source_path_to_url("lessons/flexbox.md") => "lessons/flexbox"
/// ```
pub fn source_path_to_url(path: &Path) -> String {
    path.with_extension("")
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// One `../` per directory level between the page and the site root.
pub fn root_path_for(url: &str) -> String {
    "../".repeat(url.matches('/').count())
}

/// Convert a URL path to an output file path.
///
/// # Examples
/// ```ignore
/// url_to_output_path("lessons/flexbox", output_dir) => output_dir/lessons/flexbox.html
/// url_to_output_path("index", output_dir) => output_dir/index.html
/// ```
pub fn url_to_output_path(url: &str, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.html", url.trim_start_matches('/')))
}

/// Expand a glob relative to `base_path` into the files it matches, sorted.
///
/// A pattern that matches nothing is a configuration error.
pub fn expand_glob(base_path: &Path, pattern: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let full_pattern = if Path::new(pattern).is_absolute() || base_path.as_os_str().is_empty() {
        pattern.to_string()
    } else {
        // The base path is literal even if it contains glob metacharacters
        let base = glob::Pattern::escape(&base_path.to_string_lossy());
        format!("{}/{}", base.trim_end_matches('/'), pattern)
    };

    let entries = glob::glob(&full_pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable path");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(ConfigError::EmptyGlob(pattern.to_string()));
    }

    Ok(paths)
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
