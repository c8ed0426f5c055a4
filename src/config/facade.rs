//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::sources::global_file;
use super::ArborConfig;
use config::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Location of the global config file, if a home directory is known
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::path()
    }

    /// Load configuration from defaults, the global file, `explicit` when
    /// given, and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<ArborConfig, ConfigError> {
        MergeService::load(explicit)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<ArborConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> ArborConfig {
        ArborConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("arbor.toml");
        fs::write(
            &file,
            "[index]\ninitial_capacity = 64\n\n[benchmark]\nfile_count = 10\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&file).unwrap();
        assert_eq!(config.index.initial_capacity, 64);
        assert_eq!(config.benchmark.file_count, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_with_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent.toml");
        assert!(ConfigLoader::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_environment_overlay() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("arbor.toml");
        fs::write(&file, "[benchmark]\nseed = 5\n").unwrap();

        std::env::set_var("ARBOR__BENCHMARK__SEED", "77");
        let config = ConfigLoader::load_from_file(&file);
        std::env::remove_var("ARBOR__BENCHMARK__SEED");

        assert_eq!(config.unwrap().benchmark.seed, Some(77));
    }

    #[test]
    fn test_global_config_path_ends_with_config_toml() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
