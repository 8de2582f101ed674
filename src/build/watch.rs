//! File watching for automatic rebuilds.
//!
//! Uses `notify-debouncer-full` to watch the content directory, template and
//! asset directories, and the config file for changes.

use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};

use crate::config::{Config, WatchConfig, resolve_path};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

// =============================================================================
// Watch events
// =============================================================================

/// What kind of file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// The config file itself; the config must be reloaded.
    Config,
    /// A file under the content directory.
    Content { path: PathBuf, deleted: bool },
    /// A layout or partial.
    Template { path: PathBuf },
    /// A stylesheet, script or static file.
    Asset { path: PathBuf },
}

/// Events sent from the file watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// Files changed, rebuild needed.
    FilesChanged(Vec<ChangeKind>),
    /// Watcher error occurred.
    Error(String),
}

impl WatchEvent {
    /// Whether any change in the batch requires reloading the config.
    pub fn touches_config(changes: &[ChangeKind]) -> bool {
        changes.iter().any(|change| matches!(change, ChangeKind::Config))
    }
}

// =============================================================================
// Path classification
// =============================================================================

/// Paths to watch for changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchPaths {
    pub content_dir: PathBuf,
    /// Directories holding the configured template globs.
    pub template_dirs: Vec<PathBuf>,
    /// Directories holding stylesheets, scripts and static files.
    pub asset_dirs: Vec<PathBuf>,
    pub config_path: PathBuf,
    /// Build output, ignored so writing pages never triggers a rebuild.
    pub output_dir: PathBuf,
}

impl WatchPaths {
    /// Derive the watched paths from a loaded config.
    ///
    /// Paths are canonicalized where possible so they compare equal to the
    /// paths reported by the watcher.
    pub fn from_config(config: &Config, base_path: &Path, config_path: &Path) -> Self {
        let template_dirs = config
            .templates
            .iter()
            .map(|pattern| glob_root(base_path, pattern))
            .collect();

        let mut asset_dirs: Vec<PathBuf> = config
            .assets
            .css
            .iter()
            .chain(&config.assets.js)
            .map(|pattern| glob_root(base_path, pattern))
            .collect();
        if let Some(dir) = &config.assets.static_dir {
            asset_dirs.push(resolve_path(base_path, dir));
        }

        Self {
            content_dir: canonical(config.content_dir(base_path)),
            template_dirs: dedup(template_dirs),
            asset_dirs: dedup(asset_dirs),
            config_path: canonical(config_path.to_path_buf()),
            output_dir: canonical(config.output_dir(base_path)),
        }
    }
}

/// Classifies file paths into change types.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    paths: WatchPaths,
}

impl PathClassifier {
    pub fn new(paths: WatchPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &WatchPaths {
        &self.paths
    }

    /// Classify a changed path into a ChangeKind.
    pub fn classify(&self, path: &Path, deleted: bool) -> Option<ChangeKind> {
        // Skip hidden files and directories
        if path
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return None;
        }

        if path.starts_with(&self.paths.output_dir) {
            return None;
        }

        if path == self.paths.config_path {
            return Some(ChangeKind::Config);
        }

        if path.starts_with(&self.paths.content_dir) {
            return Some(ChangeKind::Content {
                path: path.to_path_buf(),
                deleted,
            });
        }

        if self.paths.template_dirs.iter().any(|dir| path.starts_with(dir)) {
            return Some(ChangeKind::Template {
                path: path.to_path_buf(),
            });
        }

        if self.paths.asset_dirs.iter().any(|dir| path.starts_with(dir)) {
            return Some(ChangeKind::Asset {
                path: path.to_path_buf(),
            });
        }

        None // Unknown path, ignore
    }
}

/// The directory a glob pattern starts from: its leading components up to
/// the first one containing a wildcard.
fn glob_root(base_path: &Path, pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    let mut has_wildcard = false;
    for component in Path::new(pattern).components() {
        if let Component::Normal(part) = component
            && part.to_string_lossy().contains(['*', '?', '['])
        {
            has_wildcard = true;
            break;
        }
        root.push(component);
    }

    // A literal file path watches its directory
    if !has_wildcard {
        root.pop();
    }

    canonical(resolve_path(base_path, &root))
}

fn canonical(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}

fn dedup(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort();
    paths.dedup();
    paths
}

// =============================================================================
// File watcher
// =============================================================================

/// A file watcher that can use either native or polling backend.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
}

impl FileWatcher {
    /// Create a new file watcher.
    pub fn new(config: &WatchConfig, classifier: PathClassifier) -> Result<Self, WatchError> {
        let debounce_timeout = Duration::from_millis(config.debounce_ms);
        let paths = classifier.paths.clone();

        let (tx, rx) = mpsc::channel();

        let callback = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let changes: Vec<ChangeKind> = events
                    .iter()
                    .filter(|event| is_relevant_event(&event.kind))
                    .filter_map(|event| {
                        let deleted = matches!(event.kind, EventKind::Remove(_));
                        event
                            .paths
                            .first()
                            .and_then(|p| classifier.classify(p, deleted))
                    })
                    .collect();

                if !changes.is_empty() {
                    let _ = tx.send(WatchEvent::FilesChanged(changes));
                }
            }
            Err(errors) => {
                for e in errors {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            }
        };

        if config.poll {
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )?;

            add_watch_paths_to_debouncer(&mut debouncer, &paths)?;

            Ok(FileWatcher::Polling {
                _debouncer: debouncer,
                rx,
            })
        } else {
            let mut debouncer = new_debouncer(debounce_timeout, None, callback)?;

            add_watch_paths_to_debouncer(&mut debouncer, &paths)?;

            Ok(FileWatcher::Native {
                _debouncer: debouncer,
                rx,
            })
        }
    }

    /// Receive the next watch event (blocking).
    pub fn recv(&self) -> Option<WatchEvent> {
        match self {
            FileWatcher::Native { rx, .. } => rx.recv().ok(),
            FileWatcher::Polling { rx, .. } => rx.recv().ok(),
        }
    }
}

/// Add watch paths to a debouncer.
fn add_watch_paths_to_debouncer<W: Watcher, C: notify_debouncer_full::FileIdCache>(
    debouncer: &mut Debouncer<W, C>,
    paths: &WatchPaths,
) -> Result<(), WatchError> {
    let recursive = std::iter::once(&paths.content_dir)
        .chain(&paths.template_dirs)
        .chain(&paths.asset_dirs);
    for dir in recursive {
        if dir.exists() {
            debouncer.watch(dir, RecursiveMode::Recursive)?;
        }
    }

    // Watch config file's parent directory (to catch config changes)
    if let Some(parent) = paths.config_path.parent()
        && parent.exists()
    {
        debouncer.watch(parent, RecursiveMode::NonRecursive)?;
    }

    Ok(())
}

/// Check if an event kind is relevant for rebuilds.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
    )
}
