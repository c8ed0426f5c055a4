//! Node hierarchy
//!
//! Directory and file nodes stored in an arena, plus the port to the
//! external store that file nodes reference.

pub mod arena;
pub mod node;
pub mod store;

pub use arena::{Ancestors, Tree, Walk};
pub use node::{DirectoryNode, FileNode, Node, NodeKind};
pub use store::{ContentStore, LocalStore, MemoryStore};
