//! Environment variable source: ARBOR__* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `ARBOR__INDEX__INITIAL_CAPACITY=64` sets `index.initial_capacity`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("ARBOR")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
