//! Name Index
//!
//! Chained hash table mapping a node name to every live node holding that
//! name. Gives O(1) expected lookup for `search_by_index`.

use crate::types::NodeId;

pub const DEFAULT_CAPACITY: usize = 16;
const LOAD_FACTOR_NUM: usize = 3;
const LOAD_FACTOR_DEN: usize = 4;
const GROWTH_FACTOR: usize = 2;
const DJB2_SEED: u64 = 5381;

/// One key in a bucket chain with the nodes currently holding it
#[derive(Debug, Clone)]
struct Entry {
    key: String,
    values: Vec<NodeId>,
}

/// Name index: name -> set of NodeIDs
#[derive(Debug, Clone)]
pub struct NameIndex {
    buckets: Vec<Vec<Entry>>,
    len: usize,
}

impl Default for NameIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// djb2: `hash * 33 + byte`, seeded with 5381.
fn hash_name(key: &str) -> u64 {
    key.bytes().fold(DJB2_SEED, |hash, byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(u64::from(byte))
    })
}

impl NameIndex {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Index with `capacity` buckets; zero is coerced to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); capacity.max(1)],
            len: 0,
        }
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, key: &str) -> usize {
        (hash_name(key) % self.buckets.len() as u64) as usize
    }

    /// Record that `node` holds `key`.
    pub fn put(&mut self, key: &str, node: NodeId) {
        let index = self.bucket_of(key);
        if let Some(entry) = self.buckets[index].iter_mut().find(|e| e.key == key) {
            entry.values.push(node);
            return;
        }
        self.buckets[index].push(Entry {
            key: key.to_string(),
            values: vec![node],
        });
        self.len += 1;
        if self.len * LOAD_FACTOR_DEN > self.buckets.len() * LOAD_FACTOR_NUM {
            self.grow();
        }
    }

    /// Nodes currently holding `key`; empty when nobody does.
    pub fn get(&self, key: &str) -> &[NodeId] {
        self.buckets[self.bucket_of(key)]
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.values.as_slice())
            .unwrap_or(&[])
    }

    /// Drop `node` from the holders of `key`. The key disappears once its
    /// last holder is removed. Returns whether `node` was present.
    pub fn remove(&mut self, key: &str, node: NodeId) -> bool {
        let index = self.bucket_of(key);
        let bucket = &mut self.buckets[index];
        let Some(position) = bucket.iter().position(|e| e.key == key) else {
            return false;
        };
        let values = &mut bucket[position].values;
        let Some(slot) = values.iter().position(|v| *v == node) else {
            return false;
        };
        values.swap_remove(slot);
        if values.is_empty() {
            bucket.swap_remove(position);
            self.len -= 1;
        }
        true
    }

    /// Every (name, holders) pair, in bucket order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.buckets
            .iter()
            .flatten()
            .map(|e| (e.key.as_str(), e.values.as_slice()))
    }

    fn grow(&mut self) {
        let capacity = self.buckets.len() * GROWTH_FACTOR;
        let old = std::mem::replace(&mut self.buckets, vec![Vec::new(); capacity]);
        for entry in old.into_iter().flatten() {
            let index = (hash_name(&entry.key) % capacity as u64) as usize;
            self.buckets[index].push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> NodeId {
        NodeId::new(n, 0)
    }

    #[test]
    fn test_hash_is_deterministic_and_order_sensitive() {
        assert_eq!(hash_name(""), DJB2_SEED);
        assert_eq!(hash_name("a"), DJB2_SEED * 33 + 97);
        assert_eq!(hash_name("ab"), hash_name("ab"));
        assert_ne!(hash_name("ab"), hash_name("ba"));
    }

    #[test]
    fn test_get_absent_is_empty() {
        let index = NameIndex::new();
        assert!(index.get("nothing").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_put_groups_nodes_under_one_name() {
        let mut index = NameIndex::new();
        index.put("report", id(1));
        index.put("report", id(2));
        index.put("notes", id(3));

        assert_eq!(index.len(), 2);
        let mut holders = index.get("report").to_vec();
        holders.sort();
        assert_eq!(holders, vec![id(1), id(2)]);
        assert_eq!(index.get("notes"), &[id(3)]);
    }

    #[test]
    fn test_remove_only_matching_node() {
        let mut index = NameIndex::new();
        index.put("report", id(1));
        index.put("report", id(2));

        assert!(!index.remove("report", id(9)));
        assert!(index.remove("report", id(1)));
        assert_eq!(index.get("report"), &[id(2)]);
        assert_eq!(index.len(), 1);

        assert!(index.remove("report", id(2)));
        assert!(index.get("report").is_empty());
        assert_eq!(index.len(), 0);
        assert!(!index.remove("report", id(2)));
    }

    #[test]
    fn test_grows_past_load_factor_and_keeps_entries() {
        let mut index = NameIndex::with_capacity(4);
        for n in 0..3 {
            index.put(&format!("name{n}"), id(n));
        }
        assert_eq!(index.capacity(), 4);

        index.put("name3", id(3));
        assert_eq!(index.capacity(), 8);

        for n in 4..100 {
            index.put(&format!("name{n}"), id(n));
        }
        assert_eq!(index.len(), 100);
        assert!(index.capacity() * 3 >= index.len() * 4);
        for n in 0..100 {
            assert_eq!(index.get(&format!("name{n}")), &[id(n)]);
        }
        assert_eq!(index.iter().count(), 100);
    }

    #[test]
    fn test_zero_capacity_is_coerced() {
        let mut index = NameIndex::with_capacity(0);
        assert_eq!(index.capacity(), 1);
        index.put("a", id(0));
        assert_eq!(index.get("a"), &[id(0)]);
    }
}
