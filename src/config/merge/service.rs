//! MergeService: orchestrates sources, applies merge policy, deserializes to ArborConfig.

use super::builder_with_defaults;
use crate::config::sources::{environment, global_file};
use crate::config::ArborConfig;
use config::{ConfigError, File};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<ArborConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => builder.add_source(File::from(path)),
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        Self::finish(builder.build()?)
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<ArborConfig, ConfigError> {
        let builder = builder_with_defaults()?.add_source(File::from(path));
        let builder = environment::add_to_builder(builder)?;

        Self::finish(builder.build()?)
    }

    fn finish(config: config::Config) -> Result<ArborConfig, ConfigError> {
        config.try_deserialize()
    }
}
