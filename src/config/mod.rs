//! Configuration
//!
//! Layered settings for the CLI and the comparison harness: built-in
//! defaults, the global `config.toml`, an explicit `--config` file, then
//! `ARBOR__*` environment variables.

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

use crate::index::hash::DEFAULT_CAPACITY;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArborConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub benchmark: BenchmarkConfig,

    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Name index sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Bucket count of a fresh name index; zero is treated as one
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
        }
    }
}

fn default_initial_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Comparison harness settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_file_count")]
    pub file_count: usize,

    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Fixed RNG seed; a random one is drawn and reported when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            file_count: default_file_count(),
            iterations: default_iterations(),
            seed: None,
        }
    }
}

fn default_file_count() -> usize {
    1000
}

fn default_iterations() -> usize {
    100
}

/// Scripts applied to every CLI session before the command runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub scripts: Vec<PathBuf>,
}
