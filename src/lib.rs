//! Arbor: In-Memory Virtual File System
//!
//! A hierarchical tree of directories and file references kept in memory,
//! with two search strategies over node names: a full pre-order traversal
//! and a chained hash index, plus prefix completion from a counting trie.
//! [`vfs::Vfs`] is the only mutation path and keeps all three in step.

pub mod config;
pub mod error;
pub mod harness;
pub mod index;
pub mod loader;
pub mod logging;
pub mod path;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod vfs;

pub use error::{ApiError, VfsError};
pub use types::NodeId;
pub use vfs::{Target, Vfs};
