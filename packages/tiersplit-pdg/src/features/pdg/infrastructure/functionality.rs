//! Slice-root counting primitives
//!
//! All of these walk forward over CONTROL edges from a slice root and look
//! at the edges of every reached node. The rewrite pass uses the counts to
//! decide whether a value has to be replicated, observed or stays local.

use crate::features::pdg::domain::{EdgeType, FType, PdgNode};
use crate::features::pdg::infrastructure::pdg::ProgramDependenceGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::warn;

impl ProgramDependenceGraph {
    /// Nodes below `root` over CONTROL edges, each once, BFS order.
    ///
    /// The visited set starts from the root's immediate successors, so a
    /// CONTROL cycle leading back to the root reaches it like any other node.
    fn control_reach(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let limit = self.config().worklist_limit;
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::new();
        for succ in self.out_nodes(root, Some(EdgeType::Control)) {
            if visited.insert(succ) {
                queue.push_back(succ);
            }
        }

        let mut reached = Vec::new();
        while let Some(node) = queue.pop_front() {
            if reached.len() >= limit {
                warn!("slice walk from {} hit worklist limit {}", self.node(root), limit);
                break;
            }
            reached.push(node);
            for succ in self.out_nodes(node, Some(EdgeType::Control)) {
                if visited.insert(succ) {
                    queue.push_back(succ);
                }
            }
        }
        reached
    }

    /// Every node in the slice
    pub fn get_nodes(&self, root: NodeIndex) -> Vec<NodeIndex> {
        self.control_reach(root)
    }

    /// Slice nodes accepted by `filter`
    pub fn get_nodes_filtered<F>(&self, root: NodeIndex, filter: F) -> Vec<NodeIndex>
    where
        F: Fn(&PdgNode) -> bool,
    {
        self.control_reach(root)
            .into_iter()
            .filter(|&n| filter(self.node(n)))
            .collect()
    }

    /// Edges of `edge_type` in `direction`, summed over the slice
    pub fn count_edge_type(&self, root: NodeIndex, edge_type: EdgeType, direction: Direction) -> usize {
        self.control_reach(root)
            .into_iter()
            .map(|n| self.edges(n, direction, Some(edge_type)).len())
            .sum()
    }

    /// Like `count_edge_type`, counting only neighbours tagged `ftype`
    pub fn count_edge_type_to(
        &mut self,
        root: NodeIndex,
        edge_type: EdgeType,
        ftype: &FType,
        direction: Direction,
    ) -> usize {
        let mut count = 0;
        for node in self.control_reach(root) {
            for neighbour in self.neighbours(node, direction, Some(edge_type)) {
                if self.get_ftype(neighbour, false).as_ref() == Some(ftype) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Like `count_edge_type`, filtering on the neighbour's slice root
    pub fn count_edge_type_filter_func<F>(
        &self,
        root: NodeIndex,
        edge_type: EdgeType,
        filter: F,
        direction: Direction,
    ) -> usize
    where
        F: Fn(Option<&PdgNode>) -> bool,
    {
        self.control_reach(root)
            .into_iter()
            .flat_map(|n| self.neighbours(n, direction, Some(edge_type)))
            .filter(|&neighbour| filter(self.functionality(neighbour).map(|f| self.node(f))))
            .count()
    }

    /// Like `count_edge_type`, filtering on the neighbour itself
    pub fn count_edge_type_filter_node<F>(
        &self,
        root: NodeIndex,
        edge_type: EdgeType,
        filter: F,
        direction: Direction,
    ) -> usize
    where
        F: Fn(&PdgNode) -> bool,
    {
        self.control_reach(root)
            .into_iter()
            .flat_map(|n| self.neighbours(n, direction, Some(edge_type)))
            .filter(|&neighbour| filter(self.node(neighbour)))
            .count()
    }

    /// Distinct tags of the neighbours across `edge_type`, in discovery order
    pub fn get_fnodes(&mut self, root: NodeIndex, edge_type: EdgeType, direction: Direction) -> Vec<FType> {
        let mut tags: Vec<FType> = Vec::new();
        for node in self.control_reach(root) {
            for neighbour in self.neighbours(node, direction, Some(edge_type)) {
                if let Some(tag) = self.get_ftype(neighbour, false) {
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
            }
        }
        tags
    }
}
