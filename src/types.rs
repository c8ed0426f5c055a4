//! Core types for the arbor virtual file system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Creation timestamp carried by every node.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// NodeId: handle to a node slot in the tree arena.
///
/// The generation is bumped whenever a slot is released, so a handle kept
/// past the deletion of its node never resolves to whatever reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
