//! Stylesheet/script path lists and static file copying.
//!
//! CSS and JS globs are expanded into ordered path lists handed to templates
//! (so layouts can emit `<link>`/`<script>` tags), and each matched file is
//! copied into the output under the same relative path.

use std::path::{Path, PathBuf};

use crate::config::{AssetsConfig, ConfigError, resolve_path};

use super::paths::expand_glob;

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A file to copy, and its `/`-separated path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub source: PathBuf,
    pub output_path: String,
}

/// Every asset the site references or ships.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAssets {
    pub css: Vec<Asset>,
    pub js: Vec<Asset>,
    pub static_files: Vec<Asset>,
}

impl ResolvedAssets {
    /// Expand the configured globs relative to `base_path`.
    ///
    /// Each CSS/JS glob must match at least one file. Files matched by more
    /// than one glob keep their first position.
    pub fn resolve(config: &AssetsConfig, base_path: &Path) -> Result<Self, AssetError> {
        let css = resolve_globs(&config.css, base_path)?;
        let js = resolve_globs(&config.js, base_path)?;

        let static_files = match &config.static_dir {
            Some(dir) => {
                let dir = resolve_path(base_path, dir);
                if !dir.is_dir() {
                    return Err(ConfigError::Validation(format!(
                        "static directory does not exist: {}",
                        dir.display()
                    ))
                    .into());
                }
                match expand_glob(&dir, "**/*") {
                    Ok(files) => files
                        .into_iter()
                        .map(|source| {
                            let output_path = relative_url(&source, &dir);
                            Asset {
                                source,
                                output_path,
                            }
                        })
                        .collect(),
                    Err(ConfigError::EmptyGlob(_)) => Vec::new(),
                    Err(e) => return Err(e.into()),
                }
            }
            None => Vec::new(),
        };

        Ok(Self {
            css,
            js,
            static_files,
        })
    }

    /// Stylesheet paths in link order.
    pub fn css_paths(&self) -> Vec<String> {
        self.css.iter().map(|a| a.output_path.clone()).collect()
    }

    /// Script paths in load order.
    pub fn js_paths(&self) -> Vec<String> {
        self.js.iter().map(|a| a.output_path.clone()).collect()
    }

    /// Copy every asset into `output_dir`. Returns the number of files copied.
    pub fn copy_to(&self, output_dir: &Path) -> Result<usize, AssetError> {
        let all = self.css.iter().chain(&self.js).chain(&self.static_files);
        let mut copied = 0;
        for asset in all {
            let to = output_dir.join(&asset.output_path);
            if let Some(parent) = to.parent() {
                std::fs::create_dir_all(parent).map_err(|source| AssetError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::copy(&asset.source, &to).map_err(|source| AssetError::Copy {
                from: asset.source.clone(),
                to: to.clone(),
                source,
            })?;
            copied += 1;
        }
        Ok(copied)
    }
}

fn resolve_globs(patterns: &[String], base_path: &Path) -> Result<Vec<Asset>, AssetError> {
    let mut assets: Vec<Asset> = Vec::new();
    for pattern in patterns {
        for source in expand_glob(base_path, pattern)? {
            if assets.iter().any(|a| a.source == source) {
                continue;
            }
            let output_path = relative_url(&source, base_path);
            assets.push(Asset {
                source,
                output_path,
            });
        }
    }
    Ok(assets)
}

/// `path` relative to `root`, joined with `/`.
fn relative_url(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
