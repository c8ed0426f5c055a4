//! Filesystem node types

use crate::error::VfsError;
use crate::tree::store::ContentStore;
use crate::types::{NodeId, Timestamp};
use std::path::{Path, PathBuf};

/// File node: a reference to external content, never the content itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub physical_path: PathBuf,
}

/// Directory node representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    pub(crate) children: Vec<NodeId>, // insertion order
}

/// Node variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File(FileNode),
    Directory(DirectoryNode),
}

/// A node in the virtual tree.
///
/// Nodes live in the tree arena and refer to their parent by handle only;
/// ownership runs strictly from a directory to its children.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    created_at: Timestamp,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    /// Create a detached, empty directory node
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: chrono::Utc::now(),
            parent: None,
            kind: NodeKind::Directory(DirectoryNode::default()),
        }
    }

    /// Create a detached file node referencing `physical_path`.
    ///
    /// Fails with `PhysicalFileMissing` when the store cannot resolve the
    /// path. The recorded path is the one the store resolved it to.
    pub fn file(
        name: impl Into<String>,
        physical_path: &Path,
        store: &dyn ContentStore,
    ) -> Result<Self, VfsError> {
        let resolved = store
            .resolve(physical_path)
            .ok_or_else(|| VfsError::PhysicalFileMissing(physical_path.to_path_buf()))?;
        Ok(Self {
            name: name.into(),
            created_at: chrono::Utc::now(),
            parent: None,
            kind: NodeKind::File(FileNode {
                physical_path: resolved,
            }),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Parent directory handle; `None` for the root and for detached nodes
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File(_))
    }

    /// Children in insertion order (empty for files)
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Directory(dir) => &dir.children,
            NodeKind::File(_) => &[],
        }
    }

    pub fn physical_path(&self) -> Option<&Path> {
        match &self.kind {
            NodeKind::File(file) => Some(&file.physical_path),
            NodeKind::Directory(_) => None,
        }
    }

    /// Size contributed by this node alone. Files ask the store and resolve
    /// to zero when the reference has gone stale; directories contribute
    /// nothing of their own.
    pub fn own_size(&self, store: &dyn ContentStore) -> u64 {
        match &self.kind {
            NodeKind::File(file) => store.size(&file.physical_path).unwrap_or(0),
            NodeKind::Directory(_) => 0,
        }
    }

    /// Detached copy with a fresh creation time and no children.
    pub(crate) fn duplicate(&self) -> Self {
        let kind = match &self.kind {
            NodeKind::File(file) => NodeKind::File(file.clone()),
            NodeKind::Directory(_) => NodeKind::Directory(DirectoryNode::default()),
        };
        Self {
            name: self.name.clone(),
            created_at: chrono::Utc::now(),
            parent: None,
            kind,
        }
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Directory(dir) => Some(&mut dir.children),
            NodeKind::File(_) => None,
        }
    }
}
