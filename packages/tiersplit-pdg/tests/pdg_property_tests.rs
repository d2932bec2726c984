//! Property-based tests for the PDG
//!
//! Invariants that should hold for ALL generated graphs:
//! - Mirroring: every edge is seen from both endpoints, before and after removals
//! - Closure: never contains its origin, never repeats a node
//! - Memoization: a cached tag equals a forced recomputation on an unchanged graph
//! - Termination: traversals return on arbitrary cycles

mod common;

use common::*;
use proptest::prelude::*;
use tiersplit_pdg::{
    AnalysisConfig, EdgeType, NodeIndex, ParamDirection, ProgramDependenceGraph, Tier,
};

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Kind {
    Statement,
    Call,
    ActualIn,
    FormalIn,
    Entry,
}

fn kind_strategy() -> impl Strategy<Value = Kind> {
    prop_oneof![
        4 => Just(Kind::Statement),
        1 => Just(Kind::Call),
        1 => Just(Kind::ActualIn),
        1 => Just(Kind::FormalIn),
        1 => Just(Kind::Entry),
    ]
}

fn edge_type_strategy() -> impl Strategy<Value = EdgeType> {
    prop_oneof![
        3 => Just(EdgeType::Control),
        3 => Just(EdgeType::Data),
        1 => Just(EdgeType::Call),
        1 => Just(EdgeType::RemoteData),
        1 => Just(EdgeType::RemoteCall),
    ]
}

#[derive(Debug, Clone)]
struct GraphShape {
    kinds: Vec<Kind>,
    edges: Vec<(usize, usize, EdgeType)>,
    slice_edges: Vec<(bool, usize)>,
}

fn graph_strategy() -> impl Strategy<Value = GraphShape> {
    prop::collection::vec(kind_strategy(), 1..24).prop_flat_map(|kinds| {
        let n = kinds.len();
        (
            Just(kinds),
            prop::collection::vec((0..n, 0..n, edge_type_strategy()), 0..64),
            prop::collection::vec((any::<bool>(), 0..n), 0..6),
        )
            .prop_map(|(kinds, edges, slice_edges)| GraphShape {
                kinds,
                edges,
                slice_edges,
            })
    })
}

/// Build the graph; slice roots come first, then the generated nodes
fn build(shape: &GraphShape) -> (ProgramDependenceGraph, Vec<NodeIndex>) {
    let config = AnalysisConfig::default().worklist_limit(10_000);
    let mut b = GraphBuilder::new();
    b.pdg.set_config(config).unwrap();
    let client = b.tier(Tier::Client);
    let server = b.tier(Tier::Server);

    let nodes: Vec<NodeIndex> = shape
        .kinds
        .iter()
        .map(|kind| match kind {
            Kind::Statement => b.statement(),
            Kind::Call => b.call(),
            Kind::ActualIn => b.actual(ParamDirection::In),
            Kind::FormalIn => b.formal("p", ParamDirection::In),
            Kind::Entry => b.entry(),
        })
        .collect();

    for &(server_side, target) in &shape.slice_edges {
        let root = if server_side { server } else { client };
        b.control(root, nodes[target]);
    }
    for &(from, to, edge_type) in &shape.edges {
        b.edge(nodes[from], nodes[to], edge_type);
    }
    (b.build(), nodes)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_edges_mirrored_after_removals(
        shape in graph_strategy(),
        removals in prop::collection::vec((any::<prop::sample::Index>(), any::<bool>()), 0..16),
    ) {
        let (mut pdg, nodes) = build(&shape);
        assert_mirrored(&pdg);

        for (pick, typed) in removals {
            if shape.edges.is_empty() {
                break;
            }
            let (from, to, edge_type) = shape.edges[pick.index(shape.edges.len())];
            let before = pdg.edge_count();
            let removed = pdg.remove_edge_out(nodes[from], nodes[to], typed.then_some(edge_type));
            prop_assert_eq!(pdg.edge_count(), before - removed);
            if let Some(t) = typed.then_some(edge_type) {
                prop_assert!(!pdg.out_nodes(nodes[from], Some(t)).contains(&nodes[to]));
                prop_assert!(!pdg.in_nodes(nodes[to], Some(t)).contains(&nodes[from]));
            }
        }
        assert_mirrored(&pdg);
        prop_assert!(pdg.verify().is_ok());
    }

    #[test]
    fn prop_closure_excludes_origin_and_duplicates(
        shape in graph_strategy(),
        cross_tier in any::<bool>(),
        include_actual_params in any::<bool>(),
    ) {
        let (pdg, nodes) = build(&shape);
        for &origin in &nodes {
            let deps = pdg.data_dependent_nodes(origin, cross_tier, include_actual_params);
            assert_clean_closure(origin, &deps);
        }
    }

    #[test]
    fn prop_cached_ftype_matches_recheck(shape in graph_strategy()) {
        let (mut pdg, nodes) = build(&shape);
        for &n in &nodes {
            let cached = pdg.get_ftype(n, false);
            prop_assert_eq!(pdg.get_ftype(n, false), cached.clone());
            prop_assert_eq!(pdg.get_ftype(n, true), cached);
        }
    }

    #[test]
    fn prop_traversals_terminate(shape in graph_strategy()) {
        let (mut pdg, nodes) = build(&shape);
        let first = nodes[0];
        let last = nodes[nodes.len() - 1];

        // any edge out of `first` makes its own target reachable
        for target in pdg.out_nodes(first, None) {
            prop_assert!(pdg.path_exists_to(first, target));
        }
        let _ = pdg.path_exists_to(last, first);
        for &n in &nodes {
            let _ = pdg.enclosing_entry(n);
            let _ = pdg.is_shared_node(n);
            if pdg.node(n).is_call_node() {
                let _ = pdg.stm_nodes(n);
                let _ = pdg.outermost_call(n);
            }
            if pdg.node(n).is_entry_node() {
                let body = pdg.body(n);
                prop_assert!(!body.contains(&n));
            }
        }
    }
}
