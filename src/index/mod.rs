//! Auxiliary search structures kept in lockstep with the tree.

pub mod hash;
pub mod trie;

pub use hash::NameIndex;
pub use trie::PrefixTrie;
