//! Error types for the virtual file system and its outer layers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the VFS facade and the node hierarchy.
///
/// Every error is reported before any mutation starts, so a failed call
/// leaves the tree and both indices untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VfsError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Name collision: '{name}' already exists in {parent}")]
    NameCollision { parent: String, name: String },

    #[error("Physical file does not exist: {}", .0.display())]
    PhysicalFileMissing(PathBuf),

    #[error("Node reference is null or no longer live")]
    NodeNull,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Errors surfaced by the loader, harness, configuration and CLI layers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// `verify` found violations; carries the rendered report
    #[error("Consistency check failed\n{0}")]
    Inconsistent(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for ApiError {
    fn from(err: toml::ser::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vfs_error_converts_into_api_error() {
        let err: ApiError = VfsError::PathNotFound("/missing".to_string()).into();
        assert!(matches!(err, ApiError::Vfs(VfsError::PathNotFound(_))));
        assert_eq!(err.to_string(), "Path not found: /missing");
    }

    #[test]
    fn test_name_collision_message() {
        let err = VfsError::NameCollision {
            parent: "/home".to_string(),
            name: "docs".to_string(),
        };
        assert_eq!(err.to_string(), "Name collision: 'docs' already exists in /home");
    }
}
