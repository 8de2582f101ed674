pub mod build;
pub mod clean;
pub mod init;
pub mod serve;

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_CONFIG_FILE;

/// Absolute path of the config file named on the command line.
fn config_path(config_file: Option<&Path>) -> Result<PathBuf, std::io::Error> {
    let config_path = config_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
    if config_path.is_relative() {
        Ok(std::env::current_dir()?.join(&config_path))
    } else {
        Ok(config_path)
    }
}
