//! Configuration loading from files.
//!
//! The YAML file is the base layer; `COURSEBOOK__SECTION__KEY` environment
//! variables override individual values (e.g. `COURSEBOOK__SITE__OUTPUT=dist`).

use std::path::Path;

use super::{Config, ConfigError, DEFAULT_CONFIG_FILE};

impl Config {
    /// Load the config from the command line argument, defaulting to `coursebook.yaml`
    pub async fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file).await
    }

    /// Load the config from a file path
    pub(crate) async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        tracing::debug!(path = %path.display(), "Loading config");

        let config = config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix("COURSEBOOK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Config>()?;

        config.validate()?;
        Ok(config)
    }
}
