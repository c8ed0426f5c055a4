//! Random operation sequences: after every step the tree, the name index
//! and the prefix trie must agree, and a failed call must change nothing.

use arbor::tree::MemoryStore;
use arbor::{NodeId, Vfs, VfsError};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

const NAMES: &[&str] = &["a", "ab", "abc", "b", "report", "r"];
const BLOB: &str = "/blob";

#[derive(Debug, Clone)]
enum Op {
    Mkdir { parent: usize, name: usize },
    Mkfile { parent: usize, name: usize },
    Delete { target: usize },
    Rename { target: usize, name: usize },
    Move { target: usize, dest: usize },
    Copy { target: usize, dest: usize },
}

fn op() -> impl Strategy<Value = Op> {
    let name = 0..NAMES.len();
    prop_oneof![
        4 => (any::<usize>(), name.clone()).prop_map(|(parent, name)| Op::Mkdir { parent, name }),
        3 => (any::<usize>(), name.clone()).prop_map(|(parent, name)| Op::Mkfile { parent, name }),
        1 => any::<usize>().prop_map(|target| Op::Delete { target }),
        2 => (any::<usize>(), name).prop_map(|(target, name)| Op::Rename { target, name }),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(target, dest)| Op::Move { target, dest }),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(target, dest)| Op::Copy { target, dest }),
    ]
}

fn live_nodes(vfs: &Vfs) -> Vec<NodeId> {
    vfs.walk(vfs.root()).map(|(_, id)| id).collect()
}

fn pick(nodes: &[NodeId], i: usize) -> NodeId {
    nodes[i % nodes.len()]
}

fn snapshot(vfs: &Vfs) -> Vec<(NodeId, String)> {
    live_nodes(vfs)
        .into_iter()
        .map(|id| (id, vfs.find_virtual_path(id)))
        .collect()
}

fn apply(vfs: &mut Vfs, op: &Op) -> Result<(), VfsError> {
    let nodes = live_nodes(vfs);
    match *op {
        Op::Mkdir { parent, name } => {
            let parent = vfs.find_virtual_path(pick(&nodes, parent));
            vfs.create_directory(&parent, NAMES[name]).map(|_| ())
        }
        Op::Mkfile { parent, name } => {
            let parent = vfs.find_virtual_path(pick(&nodes, parent));
            vfs.create_file(&parent, NAMES[name], BLOB).map(|_| ())
        }
        Op::Delete { target } => vfs.delete_node(pick(&nodes, target)),
        Op::Rename { target, name } => vfs.rename_node(pick(&nodes, target), NAMES[name]),
        Op::Move { target, dest } => vfs.move_node(pick(&nodes, target), pick(&nodes, dest)),
        Op::Copy { target, dest } => vfs
            .copy_node(pick(&nodes, target), pick(&nodes, dest))
            .map(|_| ()),
    }
}

fn check_in_step(vfs: &Vfs) -> Result<(), TestCaseError> {
    let report = vfs.verify();
    prop_assert!(report.is_consistent(), "{:?}", report.problems);

    for name in NAMES {
        let by_index: HashSet<NodeId> = vfs.search_by_index(name).iter().copied().collect();
        let by_traversal: HashSet<NodeId> = vfs.search_by_traversal(name).into_iter().collect();
        prop_assert_eq!(by_index, by_traversal);
    }

    let held: BTreeSet<String> = live_nodes(vfs)
        .into_iter()
        .skip(1)
        .filter_map(|id| vfs.node(id).map(|node| node.name().to_string()))
        .collect();
    let suggested: BTreeSet<String> = vfs.get_suggestions("").into_iter().collect();
    prop_assert_eq!(held, suggested);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_operations_keep_indices_in_step(ops in prop::collection::vec(op(), 1..60)) {
        let mut vfs = Vfs::with_store(Box::new(MemoryStore::new().with_file(BLOB, 3)));
        for op in &ops {
            let before = snapshot(&vfs);
            if apply(&mut vfs, op).is_err() {
                prop_assert_eq!(&before, &snapshot(&vfs), "failed {:?} mutated the tree", op);
            }
            check_in_step(&vfs)?;
        }
    }

    #[test]
    fn successful_moves_keep_node_count(ops in prop::collection::vec(op(), 1..40), moves in prop::collection::vec((any::<usize>(), any::<usize>()), 1..20)) {
        let mut vfs = Vfs::with_store(Box::new(MemoryStore::new().with_file(BLOB, 3)));
        for op in &ops {
            let _ = apply(&mut vfs, op);
        }
        let ids: BTreeSet<NodeId> = live_nodes(&vfs).into_iter().collect();
        for (target, dest) in moves {
            let _ = apply(&mut vfs, &Op::Move { target, dest });
            let after: BTreeSet<NodeId> = live_nodes(&vfs).into_iter().collect();
            prop_assert_eq!(&ids, &after);
        }
        check_in_step(&vfs)?;
    }
}
