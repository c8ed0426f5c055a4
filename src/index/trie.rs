//! Prefix Index
//!
//! Trie over node names with a terminal counter per node, so a name held
//! by several nodes stays present until every holder has been erased.
//! Insert, search, erase and completion all run iteratively.

use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    count: usize,
}

// Flatten on drop; a long word is a deep chain of nested maps.
impl Drop for TrieNode {
    fn drop(&mut self) {
        let mut stack: Vec<TrieNode> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

impl TrieNode {
    fn is_prunable(&self) -> bool {
        self.count == 0 && self.children.is_empty()
    }
}

/// Multiset of names supporting prefix completion
#[derive(Debug, Default)]
pub struct PrefixTrie {
    root: TrieNode,
    distinct: usize,
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct words currently present
    pub fn len(&self) -> usize {
        self.distinct
    }

    pub fn is_empty(&self) -> bool {
        self.distinct == 0
    }

    /// Add one occurrence of `word`. Empty words are ignored.
    pub fn insert(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        node.count += 1;
        if node.count == 1 {
            self.distinct += 1;
        }
    }

    fn find(&self, word: &str) -> Option<&TrieNode> {
        word.chars()
            .try_fold(&self.root, |node, c| node.children.get(&c))
    }

    /// True while at least one occurrence of `word` remains.
    pub fn search(&self, word: &str) -> bool {
        !word.is_empty() && self.find(word).is_some_and(|node| node.count > 0)
    }

    /// Number of outstanding occurrences of `word`.
    pub fn occurrences(&self, word: &str) -> usize {
        if word.is_empty() {
            return 0;
        }
        self.find(word).map_or(0, |node| node.count)
    }

    /// Remove one occurrence of `word`, pruning branches that no longer
    /// lead to any word. Returns whether an occurrence was removed.
    pub fn erase(&mut self, word: &str) -> bool {
        if !self.search(word) {
            return false;
        }
        let chars: Vec<char> = word.chars().collect();

        // Decrement, remembering the deepest node that must survive: one
        // that still ends a word or branches off the erased path.
        let mut keep_depth = 0;
        let mut node = &mut self.root;
        for (depth, c) in chars.iter().enumerate() {
            if depth > 0 && (node.count > 0 || node.children.len() > 1) {
                keep_depth = depth;
            }
            node = match node.children.get_mut(c) {
                Some(child) => child,
                None => return false,
            };
        }
        node.count -= 1;
        if node.count == 0 {
            self.distinct -= 1;
        }
        if !node.is_prunable() {
            return true;
        }

        // Cut the dead tail below the deepest surviving node
        let mut survivor = &mut self.root;
        for c in &chars[..keep_depth] {
            survivor = match survivor.children.get_mut(c) {
                Some(child) => child,
                None => return true,
            };
        }
        survivor.children.remove(&chars[keep_depth]);
        true
    }

    /// Every present word starting with `prefix`, each reported once, in
    /// lexicographic order. Empty when no word has that prefix.
    pub fn auto_complete(&self, prefix: &str) -> Vec<String> {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };
        let mut results = Vec::new();
        let mut stack = vec![(start, prefix.to_string())];
        while let Some((node, word)) = stack.pop() {
            if node.count > 0 {
                results.push(word.clone());
            }
            for (c, child) in node.children.iter().rev() {
                let mut next = word.clone();
                next.push(*c);
                stack.push((child, next));
            }
        }
        results
    }
}
