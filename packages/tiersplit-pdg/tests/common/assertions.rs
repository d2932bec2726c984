//! Custom assertions for graph invariants

use tiersplit_pdg::{NodeIndex, ProgramDependenceGraph};

/// Every outgoing edge is an incoming edge of its target, and vice versa
pub fn assert_mirrored(pdg: &ProgramDependenceGraph) {
    for node in pdg.node_indices() {
        for edge in pdg.out_edges(node, None) {
            assert!(
                pdg.in_edges(edge.to, None).contains(&edge),
                "edge {:?} missing on the target side",
                edge
            );
        }
        for edge in pdg.in_edges(node, None) {
            assert!(
                pdg.out_edges(edge.from, None).contains(&edge),
                "edge {:?} missing on the source side",
                edge
            );
        }
    }
}

/// No duplicates and `origin` absent
pub fn assert_clean_closure(origin: NodeIndex, closure: &[NodeIndex]) {
    assert!(
        !closure.contains(&origin),
        "closure of {:?} contains its origin: {:?}",
        origin,
        closure
    );
    let mut sorted = closure.to_vec();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), closure.len(), "duplicates in {:?}", closure);
}

pub fn ids(pdg: &ProgramDependenceGraph, nodes: &[NodeIndex]) -> Vec<String> {
    nodes.iter().map(|&n| pdg.node(n).id.clone()).collect()
}
