//! VFS Facade
//!
//! Owns the node hierarchy together with the name index and the prefix
//! trie, and is the only way to mutate any of them. Every operation
//! validates first and mutates second: once the tree edit starts, the
//! matching index edits follow unconditionally before the call returns,
//! so no caller can observe the three structures out of step.

mod verify;

pub use verify::ConsistencyReport;

use crate::error::VfsError;
use crate::index::hash::DEFAULT_CAPACITY;
use crate::index::{NameIndex, PrefixTrie};
use crate::path;
use crate::tree::{ContentStore, LocalStore, Node, Tree, Walk};
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Node addressed either by virtual path or by handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Path(&'a str),
    Node(NodeId),
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(path: &'a str) -> Self {
        Target::Path(path)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(path: &'a String) -> Self {
        Target::Path(path.as_str())
    }
}

impl From<NodeId> for Target<'_> {
    fn from(id: NodeId) -> Self {
        Target::Node(id)
    }
}

/// Aggregate counters over the live tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsStats {
    pub directories: usize,
    pub files: usize,
    pub distinct_names: usize,
    pub index_capacity: usize,
    pub total_size: u64,
}

/// In-memory virtual file system
#[derive(Debug)]
pub struct Vfs {
    tree: Tree,
    names: NameIndex,
    prefixes: PrefixTrie,
    store: Box<dyn ContentStore>,
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs {
    /// Empty VFS whose files reference the local filesystem
    pub fn new() -> Self {
        Self::with_store(Box::new(LocalStore))
    }

    pub fn with_store(store: Box<dyn ContentStore>) -> Self {
        Self::with_capacity(store, DEFAULT_CAPACITY)
    }

    /// Empty VFS with `capacity` initial name-index buckets
    pub fn with_capacity(store: Box<dyn ContentStore>, capacity: usize) -> Self {
        Self {
            tree: Tree::new(),
            names: NameIndex::with_capacity(capacity),
            prefixes: PrefixTrie::new(),
            store,
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// Number of nodes below the root
    pub fn len(&self) -> usize {
        self.tree.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Children of `id` in insertion order (empty for files and stale ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.tree.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Pre-order walk below `from`, yielding `(depth, id)`
    pub fn walk(&self, from: NodeId) -> Walk<'_> {
        self.tree.walk(from)
    }

    /// Resolve a target to a live node.
    pub fn resolve<'a>(&self, target: impl Into<Target<'a>>) -> Result<NodeId, VfsError> {
        match target.into() {
            Target::Path(p) => self
                .tree
                .lookup(p)
                .ok_or_else(|| VfsError::PathNotFound(p.to_string())),
            Target::Node(id) if self.tree.contains(id) => Ok(id),
            Target::Node(_) => Err(VfsError::NodeNull),
        }
    }

    fn resolve_directory(&self, parent_path: &str) -> Result<NodeId, VfsError> {
        self.tree
            .lookup(parent_path)
            .filter(|id| self.tree.get(*id).is_some_and(Node::is_directory))
            .ok_or_else(|| VfsError::PathNotFound(parent_path.to_string()))
    }

    fn check_name(name: &str) -> Result<(), VfsError> {
        if path::is_valid_name(name) {
            Ok(())
        } else {
            Err(VfsError::InvalidOperation(format!("invalid node name '{}'", name)))
        }
    }

    fn check_free(&self, dir: NodeId, name: &str) -> Result<(), VfsError> {
        if self.tree.get_child(dir, name).is_some() {
            return Err(VfsError::NameCollision {
                parent: self.tree.path_of(dir),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Create an empty directory `name` inside the directory at `parent_path`.
    pub fn create_directory(&mut self, parent_path: &str, name: &str) -> Result<NodeId, VfsError> {
        let parent = self.resolve_directory(parent_path)?;
        Self::check_name(name)?;
        self.check_free(parent, name)?;

        let id = self.tree.add(parent, Node::directory(name))?;
        self.index(id);
        debug!(path = %self.tree.path_of(id), node = %id, "created directory");
        Ok(id)
    }

    /// Create a file `name` inside the directory at `parent_path`,
    /// referencing existing external content at `physical_path`.
    pub fn create_file(
        &mut self,
        parent_path: &str,
        name: &str,
        physical_path: impl AsRef<Path>,
    ) -> Result<NodeId, VfsError> {
        let parent = self.resolve_directory(parent_path)?;
        Self::check_name(name)?;
        self.check_free(parent, name)?;
        let node = Node::file(name, physical_path.as_ref(), self.store.as_ref())?;

        let id = self.tree.add(parent, node)?;
        self.index(id);
        debug!(
            path = %self.tree.path_of(id),
            node = %id,
            physical = %physical_path.as_ref().display(),
            "created file"
        );
        Ok(id)
    }

    /// Delete a node and its whole subtree, dropping every index entry
    /// they hold.
    pub fn delete_node<'a>(&mut self, target: impl Into<Target<'a>>) -> Result<(), VfsError> {
        let id = self.resolve(target)?;
        let (parent, name) = self.detachable(id, "delete")?;

        let path = self.tree.path_of(id);
        let subtree: Vec<NodeId> = self.tree.descendants(id).collect();
        for node in &subtree {
            self.unindex(*node);
        }
        let unlinked = self.tree.remove(parent, &name);
        debug_assert!(unlinked, "{} vanished between validation and removal", path);
        debug!(path = %path, removed = subtree.len(), "deleted node");
        Ok(())
    }

    /// Rename a node in place. Descendants keep their names and entries.
    pub fn rename_node<'a>(
        &mut self,
        target: impl Into<Target<'a>>,
        new_name: &str,
    ) -> Result<(), VfsError> {
        let id = self.resolve(target)?;
        let (parent, old_name) = self.detachable(id, "rename")?;
        Self::check_name(new_name)?;
        if old_name == new_name {
            return Ok(());
        }
        self.check_free(parent, new_name)?;

        self.unindex(id);
        if let Some(node) = self.tree.get_mut(id) {
            node.rename(new_name);
        }
        self.index(id);
        debug!(node = %id, from = %old_name, to = %new_name, "renamed node");
        Ok(())
    }

    /// Move a node with its subtree under `new_parent`. Node identity,
    /// names and index entries are preserved; only parent links change.
    pub fn move_node<'a, 'b>(
        &mut self,
        node: impl Into<Target<'a>>,
        new_parent: impl Into<Target<'b>>,
    ) -> Result<(), VfsError> {
        let id = self.resolve(node)?;
        let dest = self.resolve(new_parent)?;
        let (old_parent, name) = self.check_relocation(id, dest, "move")?;

        let from = self.tree.path_of(id);
        let extracted = self.tree.extract(old_parent, &name).ok_or(VfsError::NodeNull)?;
        self.tree.attach(dest, extracted)?;
        debug!(from = %from, to = %self.tree.path_of(id), "moved node");
        Ok(())
    }

    /// Deep-copy a node with its subtree under `new_parent`. The copies are
    /// new nodes with fresh creation times and are indexed like any other.
    pub fn copy_node<'a, 'b>(
        &mut self,
        node: impl Into<Target<'a>>,
        new_parent: impl Into<Target<'b>>,
    ) -> Result<NodeId, VfsError> {
        let id = self.resolve(node)?;
        let dest = self.resolve(new_parent)?;
        self.check_relocation(id, dest, "copy")?;

        let created = self.tree.copy_subtree(id, dest)?;
        for node in &created {
            self.index(*node);
        }
        let top = created.first().copied().ok_or(VfsError::NodeNull)?;
        debug!(to = %self.tree.path_of(top), copied = created.len(), "copied node");
        Ok(top)
    }

    /// Parent and name of a node that may leave its place in the tree.
    fn detachable(&self, id: NodeId, verb: &str) -> Result<(NodeId, String), VfsError> {
        let node = self.tree.get(id).ok_or(VfsError::NodeNull)?;
        match node.parent() {
            Some(parent) if id != self.tree.root() => Ok((parent, node.name().to_string())),
            _ => Err(VfsError::InvalidOperation(format!(
                "cannot {} the root directory",
                verb
            ))),
        }
    }

    fn check_relocation(
        &self,
        id: NodeId,
        dest: NodeId,
        verb: &str,
    ) -> Result<(NodeId, String), VfsError> {
        let (parent, name) = self.detachable(id, verb)?;
        if id == dest {
            return Err(VfsError::InvalidOperation(format!(
                "cannot {} a node into itself",
                verb
            )));
        }
        if !self.tree.get(dest).is_some_and(Node::is_directory) {
            return Err(VfsError::InvalidOperation(format!(
                "destination {} is not a directory",
                self.tree.path_of(dest)
            )));
        }
        if self.tree.ancestors(dest).any(|ancestor| ancestor == id) {
            return Err(VfsError::InvalidOperation(format!(
                "cannot {} {} into its own descendant",
                verb,
                self.tree.path_of(id)
            )));
        }
        if self.tree.get_child(dest, &name).is_some() {
            return Err(VfsError::InvalidOperation(format!(
                "destination {} already contains '{}'",
                self.tree.path_of(dest),
                name
            )));
        }
        Ok((parent, name))
    }

    fn index(&mut self, id: NodeId) {
        if let Some(node) = self.tree.get(id) {
            self.names.put(node.name(), id);
            self.prefixes.insert(node.name());
        }
    }

    fn unindex(&mut self, id: NodeId) {
        if let Some(node) = self.tree.get(id) {
            self.names.remove(node.name(), id);
            self.prefixes.erase(node.name());
        }
    }

    /// Nodes named `name`, straight from the name index.
    pub fn search_by_index(&self, name: &str) -> &[NodeId] {
        self.names.get(name)
    }

    /// Nodes named `name`, found by walking the whole tree in pre-order.
    pub fn search_by_traversal(&self, name: &str) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .skip(1)
            .filter(|id| self.tree.get(*id).is_some_and(|node| node.name() == name))
            .collect()
    }

    /// Names present in the tree that start with `prefix`.
    pub fn get_suggestions(&self, prefix: &str) -> Vec<String> {
        self.prefixes.auto_complete(prefix)
    }

    /// Absolute virtual path of `node`; `/` for the root and an empty
    /// string when the handle is stale.
    pub fn find_virtual_path(&self, node: NodeId) -> String {
        self.tree.path_of(node)
    }

    /// Total size of the content referenced below `target`.
    pub fn size<'a>(&self, target: impl Into<Target<'a>>) -> Result<u64, VfsError> {
        let id = self.resolve(target)?;
        Ok(self.tree.size(id, self.store.as_ref()))
    }

    pub fn stats(&self) -> VfsStats {
        let (directories, files) = self
            .tree
            .descendants(self.tree.root())
            .skip(1)
            .filter_map(|id| self.tree.get(id))
            .fold((0, 0), |(dirs, files), node| {
                if node.is_directory() {
                    (dirs + 1, files)
                } else {
                    (dirs, files + 1)
                }
            });
        VfsStats {
            directories,
            files,
            distinct_names: self.names.len(),
            index_capacity: self.names.capacity(),
            total_size: self.tree.size(self.tree.root(), self.store.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MemoryStore;
    use std::collections::HashSet;

    const BLOB: &str = "/blobs/data.bin";

    fn vfs() -> Vfs {
        Vfs::with_store(Box::new(MemoryStore::new().with_file(BLOB, 100)))
    }

    fn same_set(a: &[NodeId], b: &[NodeId]) -> bool {
        a.iter().collect::<HashSet<_>>() == b.iter().collect::<HashSet<_>>() && a.len() == b.len()
    }

    #[test]
    fn test_create_directory_indexes_name() {
        let mut vfs = vfs();
        let a = vfs.create_directory("/", "a").unwrap();
        assert_eq!(vfs.search_by_index("a"), &[a]);
        assert_eq!(vfs.search_by_traversal("a"), vec![a]);
        assert_eq!(vfs.get_suggestions(""), vec!["a".to_string()]);
        assert_eq!(vfs.find_virtual_path(a), "/a");
        assert_eq!(vfs.len(), 1);
    }

    #[test]
    fn test_create_directory_errors() {
        let mut vfs = vfs();
        vfs.create_directory("/", "a").unwrap();
        vfs.create_file("/", "f", BLOB).unwrap();

        assert!(matches!(
            vfs.create_directory("/", "a"),
            Err(VfsError::NameCollision { .. })
        ));
        assert!(matches!(
            vfs.create_directory("/missing", "x"),
            Err(VfsError::PathNotFound(_))
        ));
        assert!(matches!(
            vfs.create_directory("/f", "x"),
            Err(VfsError::PathNotFound(_))
        ));
        assert!(matches!(
            vfs.create_directory("/", "bad/name"),
            Err(VfsError::InvalidOperation(_))
        ));
        assert!(matches!(
            vfs.create_directory("/", ""),
            Err(VfsError::InvalidOperation(_))
        ));
        assert_eq!(vfs.len(), 2);
    }

    #[test]
    fn test_create_file_requires_physical_content() {
        let mut vfs = vfs();
        let err = vfs.create_file("/", "ghost", "/blobs/none").unwrap_err();
        assert!(matches!(err, VfsError::PhysicalFileMissing(_)));
        assert!(vfs.search_by_index("ghost").is_empty());
        assert!(vfs.get_suggestions("gh").is_empty());
    }

    #[test]
    fn test_delete_removes_subtree_from_indices() {
        let mut vfs = vfs();
        let a = vfs.create_directory("/", "a").unwrap();
        let f = vfs.create_file("/a", "f.txt", BLOB).unwrap();
        assert_eq!(vfs.search_by_index("f.txt"), &[f]);
        assert_eq!(vfs.find_virtual_path(f), "/a/f.txt");

        vfs.delete_node("/a").unwrap();
        assert!(vfs.search_by_index("f.txt").is_empty());
        assert!(vfs.search_by_index("a").is_empty());
        assert!(vfs.search_by_traversal("f.txt").is_empty());
        assert!(vfs.get_suggestions("").is_empty());
        assert_eq!(vfs.find_virtual_path(a), "");
        assert_eq!(vfs.delete_node(a), Err(VfsError::NodeNull));
        assert!(matches!(vfs.delete_node("/a"), Err(VfsError::PathNotFound(_))));
    }

    #[test]
    fn test_delete_root_is_rejected() {
        let mut vfs = vfs();
        let root = vfs.root();
        assert!(matches!(vfs.delete_node("/"), Err(VfsError::InvalidOperation(_))));
        assert!(matches!(vfs.delete_node(root), Err(VfsError::InvalidOperation(_))));
    }

    #[test]
    fn test_rename_updates_both_indices() {
        let mut vfs = vfs();
        let a = vfs.create_directory("/", "alpha").unwrap();
        let child = vfs.create_directory("/alpha", "child").unwrap();
        vfs.create_directory("/", "beta").unwrap();

        assert!(matches!(
            vfs.rename_node(a, "beta"),
            Err(VfsError::NameCollision { .. })
        ));
        vfs.rename_node("/alpha", "gamma").unwrap();

        assert!(vfs.search_by_index("alpha").is_empty());
        assert_eq!(vfs.search_by_index("gamma"), &[a]);
        assert_eq!(vfs.search_by_index("child"), &[child]);
        assert_eq!(vfs.get_suggestions("al"), Vec::<String>::new());
        assert_eq!(vfs.get_suggestions("ga"), vec!["gamma".to_string()]);
        assert_eq!(vfs.find_virtual_path(child), "/gamma/child");

        // Renaming to the current name changes nothing
        vfs.rename_node(a, "gamma").unwrap();
        assert_eq!(vfs.search_by_index("gamma"), &[a]);
    }

    #[test]
    fn test_rename_keeps_shared_name_suggested() {
        let mut vfs = vfs();
        let one = vfs.create_directory("/", "one").unwrap();
        vfs.create_directory("/", "two").unwrap();
        vfs.create_directory("/one", "report").unwrap();
        let second = vfs.create_directory("/two", "report").unwrap();

        vfs.rename_node("/one/report", "summary").unwrap();
        assert_eq!(vfs.search_by_index("report"), &[second]);
        assert!(vfs.get_suggestions("rep").contains(&"report".to_string()));
        assert!(vfs.get_suggestions("sum").contains(&"summary".to_string()));
        assert_eq!(vfs.children(one).len(), 1);
    }

    #[test]
    fn test_move_preserves_identity_and_updates_paths() {
        let mut vfs = vfs();
        let a = vfs.create_directory("/", "a").unwrap();
        let b = vfs.create_directory("/", "b").unwrap();
        let inner = vfs.create_directory("/a", "inner").unwrap();
        let f = vfs.create_file("/a/inner", "f", BLOB).unwrap();
        let created = vfs.node(f).unwrap().created_at();

        vfs.move_node(a, b).unwrap();

        assert_eq!(vfs.find_virtual_path(a), "/b/a");
        assert_eq!(vfs.find_virtual_path(inner), "/b/a/inner");
        assert_eq!(vfs.find_virtual_path(f), "/b/a/inner/f");
        assert_eq!(vfs.node(f).unwrap().created_at(), created);
        assert_eq!(vfs.node(a).unwrap().parent(), Some(b));
        assert_eq!(vfs.search_by_index("f"), &[f]);
        assert_eq!(vfs.children(a), &[inner]);
        assert!(vfs.verify().is_consistent());
    }

    #[test]
    fn test_move_rejections() {
        let mut vfs = vfs();
        let a = vfs.create_directory("/", "a").unwrap();
        let b = vfs.create_directory("/a", "b").unwrap();
        let f = vfs.create_file("/", "f", BLOB).unwrap();
        vfs.create_directory("/", "b").unwrap();
        let root = vfs.root();

        let invalid = |r: Result<(), VfsError>| matches!(r, Err(VfsError::InvalidOperation(_)));
        assert!(invalid(vfs.move_node(root, a)));
        assert!(invalid(vfs.move_node(a, a)));
        assert!(invalid(vfs.move_node(a, b)));
        assert!(invalid(vfs.move_node(b, f)));
        assert!(invalid(vfs.move_node(b, root)));
        assert!(invalid(vfs.move_node(b, a)));
        assert!(matches!(vfs.move_node("/nope", a), Err(VfsError::PathNotFound(_))));

        assert_eq!(vfs.find_virtual_path(b), "/a/b");
        assert!(vfs.verify().is_consistent());
    }

    #[test]
    fn test_copy_indexes_new_nodes() {
        let mut vfs = vfs();
        let src = vfs.create_directory("/", "src").unwrap();
        let f = vfs.create_file("/src", "f", BLOB).unwrap();
        let dest = vfs.create_directory("/", "dest").unwrap();

        let copy = vfs.copy_node(src, dest).unwrap();
        assert_ne!(copy, src);
        assert_eq!(vfs.find_virtual_path(copy), "/dest/src");
        assert_eq!(vfs.search_by_index("f").len(), 2);
        assert!(vfs.search_by_index("f").contains(&f));
        assert!(same_set(vfs.search_by_index("src"), &vfs.search_by_traversal("src")));
        assert_eq!(vfs.size(dest).unwrap(), 100);

        assert!(matches!(
            vfs.copy_node(src, dest),
            Err(VfsError::InvalidOperation(_))
        ));
        assert!(matches!(
            vfs.copy_node(dest, copy),
            Err(VfsError::InvalidOperation(_))
        ));
        assert!(vfs.verify().is_consistent());
    }

    #[test]
    fn test_strategies_agree_on_shared_names() {
        let mut vfs = vfs();
        for dir in ["x", "y", "z"] {
            vfs.create_directory("/", dir).unwrap();
            vfs.create_file(&format!("/{dir}"), "data", BLOB).unwrap();
        }
        let indexed = vfs.search_by_index("data").to_vec();
        assert_eq!(indexed.len(), 3);
        assert!(same_set(&indexed, &vfs.search_by_traversal("data")));
        assert!(vfs.search_by_traversal("").is_empty());
    }

    #[test]
    fn test_stats_and_size() {
        let mut vfs = vfs();
        vfs.create_directory("/", "a").unwrap();
        vfs.create_file("/a", "one", BLOB).unwrap();
        vfs.create_file("/", "two", BLOB).unwrap();

        let stats = vfs.stats();
        assert_eq!(stats.directories, 1);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.distinct_names, 3);
        assert_eq!(stats.total_size, 200);
        assert_eq!(vfs.size("/a").unwrap(), 100);
        assert!(matches!(vfs.size("/zzz"), Err(VfsError::PathNotFound(_))));
    }
}
