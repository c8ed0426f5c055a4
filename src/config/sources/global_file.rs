//! Global config file under the platform config directory.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::PathBuf;

const FILE_NAME: &str = "config.toml";

pub fn path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "arbor", "arbor")
        .map(|dirs| dirs.config_dir().join(FILE_NAME))
}

/// Add the global file when present; a missing file is not an error.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match path() {
        Some(path) => Ok(builder.add_source(File::from(path).required(false))),
        None => Ok(builder),
    }
}
