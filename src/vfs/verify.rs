//! Consistency checks across the tree and both indices.

use super::Vfs;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Outcome of [`Vfs::verify`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub nodes_checked: usize,
    pub names_checked: usize,
    pub problems: Vec<String>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.problems.is_empty()
    }
}

impl Vfs {
    /// Check every structural and index invariant, reporting each
    /// violation found. Read-only.
    pub fn verify(&self) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();
        let root = self.tree.root();

        match self.tree.get(root) {
            Some(node) if node.parent().is_some() => {
                report.problems.push("root has a parent".to_string())
            }
            Some(node) if !node.is_directory() => {
                report.problems.push("root is not a directory".to_string())
            }
            None => {
                report.problems.push("root is not live".to_string());
                return report;
            }
            _ => {}
        }

        // Tree shape: parent links, sibling names, single ownership
        let mut reachable: HashSet<NodeId> = HashSet::new();
        let mut holders: HashMap<&str, usize> = HashMap::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                report
                    .problems
                    .push(format!("{} is reachable more than once", id));
                continue;
            }
            let Some(node) = self.tree.get(id) else {
                report.problems.push(format!("{} is listed but not live", id));
                continue;
            };
            if id != root {
                *holders.entry(node.name()).or_default() += 1;
                let hits = self
                    .names
                    .get(node.name())
                    .iter()
                    .filter(|held| **held == id)
                    .count();
                if hits != 1 {
                    report.problems.push(format!(
                        "{} ({}) appears {} times under its name in the name index",
                        self.tree.path_of(id),
                        id,
                        hits
                    ));
                }
            }

            let mut seen = HashSet::new();
            for child in node.children() {
                let Some(child_node) = self.tree.get(*child) else {
                    report
                        .problems
                        .push(format!("{} lists dead child {}", self.tree.path_of(id), child));
                    continue;
                };
                if child_node.parent() != Some(id) {
                    report.problems.push(format!(
                        "{} has a parent link that does not match its owner {}",
                        child,
                        self.tree.path_of(id)
                    ));
                }
                if !seen.insert(child_node.name()) {
                    report.problems.push(format!(
                        "{} holds two children named '{}'",
                        self.tree.path_of(id),
                        child_node.name()
                    ));
                }
                stack.push(*child);
            }
        }
        report.nodes_checked = reachable.len();

        if self.tree.len() != reachable.len() {
            report.problems.push(format!(
                "{} live nodes are detached from the root",
                self.tree.len().saturating_sub(reachable.len())
            ));
        }

        // Name index holds nothing stale
        for (name, ids) in self.names.iter() {
            report.names_checked += 1;
            for id in ids {
                match self.tree.get(*id) {
                    Some(node) if reachable.contains(id) && node.name() == name => {}
                    _ => report.problems.push(format!(
                        "name index entry '{}' points at stale node {}",
                        name, id
                    )),
                }
            }
        }

        // Prefix trie membership and multiplicity match the held names
        for (name, count) in &holders {
            let occurrences = self.prefixes.occurrences(name);
            if occurrences != *count {
                report.problems.push(format!(
                    "prefix trie counts '{}' {} times, tree holds it {} times",
                    name, occurrences, count
                ));
            }
        }
        for word in self.prefixes.auto_complete("") {
            if !holders.contains_key(word.as_str()) {
                report
                    .problems
                    .push(format!("prefix trie still suggests '{}'", word));
            }
        }

        report
    }
}
