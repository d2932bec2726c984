//! PDG Application Layer
//!
//! Whole-program use cases built on the per-node queries.
//!
//! Main entry point: `ProgramDependenceGraph::new()`

pub use crate::features::pdg::infrastructure::{PdgStats, ProgramDependenceGraph, SharedPdg};

use crate::features::pdg::domain::{EdgeType, FType, FTypeResolution, Tier};
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use serde::Serialize;
use tracing::{debug, info};

/// Outcome counts of one classification pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationReport {
    /// Tag found on a slice root
    pub declared: usize,
    /// Ancestors exist but none is tagged; reported as shared
    pub undetermined: usize,
    /// No provenance edge at all
    pub unset: usize,
    /// Node ids defaulted to shared, in creation order
    pub undetermined_nodes: Vec<String>,
}

type Classified = (NodeIndex, FTypeResolution, Option<Tier>);

#[cfg(feature = "parallel")]
fn classify_all(pdg: &ProgramDependenceGraph, nodes: &[NodeIndex]) -> Vec<Classified> {
    use rayon::prelude::*;

    nodes
        .par_iter()
        .map(|&n| (n, pdg.classify_ftype(n), pdg.tier_of(n)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn classify_all(pdg: &ProgramDependenceGraph, nodes: &[NodeIndex]) -> Vec<Classified> {
    nodes
        .iter()
        .map(|&n| (n, pdg.classify_ftype(n), pdg.tier_of(n)))
        .collect()
}

/// Classify every node and cache the declared results.
///
/// The searches are pure and run in parallel over a fresh memo; the cache
/// is written afterwards on one thread.
pub fn classify_program(pdg: &mut ProgramDependenceGraph) -> ClassificationReport {
    pdg.invalidate_all();
    let nodes = pdg.node_indices();
    let results = classify_all(pdg, &nodes);

    let mut report = ClassificationReport::default();
    for (node, resolution, tier) in results {
        let memo = &mut pdg.node_mut(node).memo;
        memo.tier = Some(tier);
        match resolution {
            FTypeResolution::Declared(ftype) => {
                report.declared += 1;
                memo.ftype = Some(ftype);
            }
            FTypeResolution::Undetermined => {
                report.undetermined += 1;
                report.undetermined_nodes.push(pdg.node(node).id.clone());
            }
            FTypeResolution::Unset => report.unset += 1,
        }
    }

    info!(
        "classified {} nodes: {} declared, {} undetermined, {} unset",
        nodes.len(),
        report.declared,
        report.undetermined,
        report.unset
    );
    report
}

/// Cross-tier traffic of one slice root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceSummary {
    pub slice: String,
    pub ftype: FType,
    pub tier: Option<Tier>,
    pub nodes: usize,
    pub remote_data_out: usize,
    pub remote_data_in: usize,
    pub remote_calls_out: usize,
    /// Tags of the nodes this slice reads over DATA
    pub data_sources: Vec<FType>,
}

/// One summary per slice root, in creation order
pub fn summarize_slices(pdg: &mut ProgramDependenceGraph) -> Vec<SliceSummary> {
    let roots: Vec<NodeIndex> = pdg
        .node_indices()
        .into_iter()
        .filter(|&n| pdg.node(n).is_slice_node())
        .collect();

    let mut summaries = Vec::with_capacity(roots.len());
    for root in roots {
        let Some(data) = pdg.node(root).functionality_data().cloned() else {
            continue;
        };
        let summary = SliceSummary {
            slice: pdg.node(root).id.clone(),
            ftype: data.ftype,
            tier: data.tier,
            nodes: pdg.get_nodes(root).len(),
            remote_data_out: pdg.count_edge_type(root, EdgeType::RemoteData, Direction::Outgoing),
            remote_data_in: pdg.count_edge_type(root, EdgeType::RemoteData, Direction::Incoming),
            remote_calls_out: pdg.count_edge_type(root, EdgeType::RemoteCall, Direction::Outgoing),
            data_sources: pdg.get_fnodes(root, EdgeType::Data, Direction::Incoming),
        };
        debug!("slice {}: {} nodes", summary.slice, summary.nodes);
        summaries.push(summary);
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_program_report() {
        let mut pdg = ProgramDependenceGraph::new();
        let server = pdg.new_distributed_node(Tier::Server).unwrap();
        let program = pdg.new_statement_node(None);
        pdg.mark_root(program);
        let served = pdg.new_statement_node(None);
        let loose = pdg.new_statement_node(None);
        let orphan = pdg.new_statement_node(None);
        pdg.add_edge_out(server, served, EdgeType::Control, None);
        pdg.add_edge_out(program, loose, EdgeType::Control, None);

        let report = classify_program(&mut pdg);

        // server slice + served are declared; program and orphan have no
        // provenance edges
        assert_eq!(report.declared, 2);
        assert_eq!(report.undetermined, 1);
        assert_eq!(report.unset, 2);
        assert_eq!(report.undetermined_nodes, vec![pdg.node(loose).id.clone()]);
        assert_eq!(pdg.node(served).memo().ftype, Some(FType::server()));
        assert_eq!(pdg.node(served).memo().tier, Some(Some(Tier::Server)));
        assert_eq!(pdg.node(orphan).memo().tier, Some(None));
        assert_eq!(pdg.node(orphan).memo().ftype, None);
    }

    #[test]
    fn test_summarize_slices() {
        let mut pdg = ProgramDependenceGraph::new();
        let client = pdg.new_distributed_node(Tier::Client).unwrap();
        let server = pdg.new_distributed_node(Tier::Server).unwrap();
        let c1 = pdg.new_statement_node(None);
        let s1 = pdg.new_statement_node(None);
        pdg.add_edge_out(client, c1, EdgeType::Control, None);
        pdg.add_edge_out(server, s1, EdgeType::Control, None);
        pdg.add_edge_out(c1, s1, EdgeType::RemoteData, None);
        pdg.add_edge_out(s1, c1, EdgeType::Data, None);

        let summaries = summarize_slices(&mut pdg);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].slice, "Cclient");
        assert_eq!(summaries[0].remote_data_out, 1);
        assert_eq!(summaries[0].data_sources, vec![FType::server()]);
        assert_eq!(summaries[1].tier, Some(Tier::Server));
        assert_eq!(summaries[1].remote_data_in, 1);
    }
}
