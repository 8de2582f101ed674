mod assets;
mod builder;
mod document;
mod highlight;
mod html_in_md;
mod layout;
mod lessons;
mod markdown;
mod paths;
pub mod pipeline;
mod render;
mod watch;

pub use builder::{BuildResult, Builder};
pub use paths::base_path_from_config;
pub use watch::{FileWatcher, PathClassifier, WatchEvent, WatchPaths};
