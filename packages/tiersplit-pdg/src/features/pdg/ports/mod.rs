//! PDG Ports - Interface Layer (Hexagonal Architecture)
//!
//! The query surface the splitting / RPC rewrite pass is allowed to use.
//! Implementation: see `infrastructure/`.

use crate::features::pdg::domain::{EdgeType, FType};
use crate::features::pdg::infrastructure::ProgramDependenceGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;

// ═══════════════════════════════════════════════════════════════════════════
// PDG Query Port
// ═══════════════════════════════════════════════════════════════════════════

/// Tier, enumeration, counting and dependence queries over a finished PDG.
///
/// Tier queries memoize, hence `&mut self`.
pub trait PdgQueryPort: Send + Sync {
    fn is_client_node(&mut self, node: NodeIndex) -> bool;

    fn is_server_node(&mut self, node: NodeIndex) -> bool;

    fn is_shared_node(&mut self, node: NodeIndex) -> bool;

    fn body(&self, entry: NodeIndex) -> Vec<NodeIndex>;

    fn formal_in(&self, entry: NodeIndex) -> Vec<NodeIndex>;

    fn formal_out(&self, entry: NodeIndex) -> Vec<NodeIndex>;

    fn actual_in(&self, call: NodeIndex) -> Vec<NodeIndex>;

    fn actual_out(&self, call: NodeIndex) -> Vec<NodeIndex>;

    fn count_edge_type(&self, root: NodeIndex, edge_type: EdgeType, direction: Direction) -> usize;

    fn count_edge_type_to(
        &mut self,
        root: NodeIndex,
        edge_type: EdgeType,
        ftype: &FType,
        direction: Direction,
    ) -> usize;

    fn get_fnodes(&mut self, root: NodeIndex, edge_type: EdgeType, direction: Direction) -> Vec<FType>;

    fn data_dependent_nodes(
        &self,
        node: NodeIndex,
        cross_tier: bool,
        include_actual_params: bool,
    ) -> Vec<NodeIndex>;
}

impl PdgQueryPort for ProgramDependenceGraph {
    fn is_client_node(&mut self, node: NodeIndex) -> bool {
        ProgramDependenceGraph::is_client_node(self, node)
    }

    fn is_server_node(&mut self, node: NodeIndex) -> bool {
        ProgramDependenceGraph::is_server_node(self, node)
    }

    fn is_shared_node(&mut self, node: NodeIndex) -> bool {
        ProgramDependenceGraph::is_shared_node(self, node)
    }

    fn body(&self, entry: NodeIndex) -> Vec<NodeIndex> {
        ProgramDependenceGraph::body(self, entry)
    }

    fn formal_in(&self, entry: NodeIndex) -> Vec<NodeIndex> {
        ProgramDependenceGraph::formal_in(self, entry)
    }

    fn formal_out(&self, entry: NodeIndex) -> Vec<NodeIndex> {
        ProgramDependenceGraph::formal_out(self, entry)
    }

    fn actual_in(&self, call: NodeIndex) -> Vec<NodeIndex> {
        ProgramDependenceGraph::actual_in(self, call)
    }

    fn actual_out(&self, call: NodeIndex) -> Vec<NodeIndex> {
        ProgramDependenceGraph::actual_out(self, call)
    }

    fn count_edge_type(&self, root: NodeIndex, edge_type: EdgeType, direction: Direction) -> usize {
        ProgramDependenceGraph::count_edge_type(self, root, edge_type, direction)
    }

    fn count_edge_type_to(
        &mut self,
        root: NodeIndex,
        edge_type: EdgeType,
        ftype: &FType,
        direction: Direction,
    ) -> usize {
        ProgramDependenceGraph::count_edge_type_to(self, root, edge_type, ftype, direction)
    }

    fn get_fnodes(&mut self, root: NodeIndex, edge_type: EdgeType, direction: Direction) -> Vec<FType> {
        ProgramDependenceGraph::get_fnodes(self, root, edge_type, direction)
    }

    fn data_dependent_nodes(
        &self,
        node: NodeIndex,
        cross_tier: bool,
        include_actual_params: bool,
    ) -> Vec<NodeIndex> {
        ProgramDependenceGraph::data_dependent_nodes(self, node, cross_tier, include_actual_params)
    }
}
