//! Arena-backed node hierarchy
//!
//! Nodes are stored in slots addressed by [`NodeId`]. A directory owns its
//! children through the ids in its child list; the parent handle on each
//! node is a back-reference only. Detaching a subtree (`extract`) keeps its
//! slots alive so it can be reattached elsewhere with identity intact;
//! `remove` releases every slot in the subtree.
//!
//! All walks use explicit stacks, so tree depth never grows the call stack.

use crate::error::VfsError;
use crate::tree::node::Node;
use crate::tree::store::ContentStore;
use crate::types::NodeId;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// The node hierarchy: a single-rooted tree of directories and files.
#[derive(Debug)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only the root directory.
    ///
    /// The root carries an empty name; it is addressed as `/` and never
    /// appears under a name of its own.
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            live: 0,
        };
        tree.root = tree.alloc(Node::directory(String::new()));
        tree
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::new(index, 0)
    }

    fn release(&mut self, id: NodeId) -> Option<Node> {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index() as u32);
        self.live -= 1;
        Some(node)
    }

    /// Child of `dir` named `name`.
    pub fn get_child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.get(dir)?
            .children()
            .iter()
            .copied()
            .find(|child| self.get(*child).is_some_and(|node| node.name() == name))
    }

    /// Transfer a new node into `dir`, setting its parent back-reference.
    pub fn add(&mut self, dir: NodeId, node: Node) -> Result<NodeId, VfsError> {
        self.check_can_hold(dir, node.name())?;
        let id = self.alloc(node);
        self.link(dir, id);
        Ok(id)
    }

    /// Reattach a subtree previously detached with [`Tree::extract`].
    pub(crate) fn attach(&mut self, dir: NodeId, child: NodeId) -> Result<(), VfsError> {
        let name = self.get(child).ok_or(VfsError::NodeNull)?.name().to_string();
        self.check_can_hold(dir, &name)?;
        self.link(dir, child);
        Ok(())
    }

    fn check_can_hold(&self, dir: NodeId, name: &str) -> Result<(), VfsError> {
        let node = self.get(dir).ok_or(VfsError::NodeNull)?;
        if !node.is_directory() {
            return Err(VfsError::InvalidOperation(format!(
                "'{}' is not a directory",
                node.name()
            )));
        }
        if self.get_child(dir, name).is_some() {
            return Err(VfsError::NameCollision {
                parent: self.path_of(dir),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn link(&mut self, dir: NodeId, child: NodeId) {
        if let Some(node) = self.get_mut(child) {
            node.set_parent(Some(dir));
        }
        if let Some(children) = self.get_mut(dir).and_then(Node::children_mut) {
            children.push(child);
        }
    }

    /// Detach the child named `name` from `dir` and hand it back. The
    /// subtree stays allocated with no parent until it is reattached.
    pub fn extract(&mut self, dir: NodeId, name: &str) -> Option<NodeId> {
        let child = self.get_child(dir, name)?;
        if let Some(children) = self.get_mut(dir).and_then(Node::children_mut) {
            children.retain(|id| *id != child);
        }
        if let Some(node) = self.get_mut(child) {
            node.set_parent(None);
        }
        Some(child)
    }

    /// Detach the child named `name` from `dir` and release its subtree.
    pub fn remove(&mut self, dir: NodeId, name: &str) -> bool {
        let Some(child) = self.extract(dir, name) else {
            return false;
        };
        let doomed: Vec<NodeId> = self.descendants(child).collect();
        for id in doomed {
            self.release(id);
        }
        true
    }

    /// Deep-copy the subtree at `source` into `dir`. Returns the new ids in
    /// pre-order; the first one is the copy of `source`.
    pub(crate) fn copy_subtree(
        &mut self,
        source: NodeId,
        dir: NodeId,
    ) -> Result<Vec<NodeId>, VfsError> {
        let top = self.get(source).ok_or(VfsError::NodeNull)?.duplicate();
        let top_id = self.add(dir, top)?;
        let mut created = vec![top_id];

        let mut stack: Vec<(NodeId, NodeId)> = self
            .children_of(source)
            .into_iter()
            .rev()
            .map(|child| (child, top_id))
            .collect();
        while let Some((original, target_dir)) = stack.pop() {
            let Some(copy) = self.get(original).map(Node::duplicate) else {
                continue;
            };
            let copy_id = self.add(target_dir, copy)?;
            created.push(copy_id);
            stack.extend(
                self.children_of(original)
                    .into_iter()
                    .rev()
                    .map(|child| (child, copy_id)),
            );
        }
        Ok(created)
    }

    fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|node| node.children().to_vec())
            .unwrap_or_default()
    }

    /// Pre-order walk of the subtree rooted at `from`, yielding
    /// `(depth, id)` with `from` at depth 0.
    pub fn walk(&self, from: NodeId) -> Walk<'_> {
        let stack = if self.contains(from) {
            vec![(0, from)]
        } else {
            Vec::new()
        };
        Walk { tree: self, stack }
    }

    /// Pre-order ids of the subtree rooted at `from`, `from` included.
    pub fn descendants(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.walk(from).map(|(_, id)| id)
    }

    /// Parent chain of `id`, nearest first, `id` itself excluded.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(Node::parent),
        }
    }

    /// Sum of file sizes in the subtree rooted at `id`.
    pub fn size(&self, id: NodeId, store: &dyn ContentStore) -> u64 {
        self.descendants(id)
            .filter_map(|node| self.get(node))
            .map(|node| node.own_size(store))
            .sum()
    }

    /// Absolute virtual path of `id`: `/` for the root, empty when the id
    /// is not live.
    pub fn path_of(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        if id == self.root {
            return crate::path::ROOT.to_string();
        }
        let mut segments = vec![node.name()];
        for ancestor in self.ancestors(id) {
            if ancestor == self.root {
                break;
            }
            if let Some(node) = self.get(ancestor) {
                segments.push(node.name());
            }
        }
        segments.reverse();
        crate::path::from_segments(&segments)
    }

    /// Node at `path`, following child names from the root.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        crate::path::split(path)
            .into_iter()
            .try_fold(self.root, |current, segment| {
                self.get_child(current, segment)
            })
    }
}

/// Pre-order subtree iterator driven by an explicit stack.
pub struct Walk<'a> {
    tree: &'a Tree,
    stack: Vec<(usize, NodeId)>,
}

impl Iterator for Walk<'_> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        if let Some(node) = self.tree.get(id) {
            self.stack
                .extend(node.children().iter().rev().map(|child| (depth + 1, *child)));
        }
        Some((depth, id))
    }
}

/// Parent-chain iterator.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.get(current).and_then(Node::parent);
        Some(current)
    }
}
