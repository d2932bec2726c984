//! Local traversals: reachability, enclosing scopes, call discovery

use crate::features::pdg::domain::EdgeType;
use crate::features::pdg::infrastructure::pdg::ProgramDependenceGraph;
use petgraph::graph::{EdgeIndex, NodeIndex};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::warn;

impl ProgramDependenceGraph {
    /// Forward BFS over every edge type. Edges are visited at most once.
    pub fn path_exists_to(&self, from: NodeIndex, target: NodeIndex) -> bool {
        let limit = self.config().worklist_limit;
        let mut queue: VecDeque<_> = self.out_edges(from, None).into();
        let mut visited: FxHashSet<EdgeIndex> = queue.iter().map(|e| e.index).collect();
        let mut pops = 0usize;

        while let Some(edge) = queue.pop_front() {
            pops += 1;
            if pops > limit {
                warn!("reachability from {} hit worklist limit {}", self.node(from), limit);
                return false;
            }
            if edge.to == target {
                return true;
            }
            for next in self.out_edges(edge.to, None) {
                if visited.insert(next.index) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Nearest entry above `node` over CONTROL edges. Object entries do not
    /// count.
    pub fn enclosing_entry(&self, node: NodeIndex) -> Option<NodeIndex> {
        let mut queue: VecDeque<NodeIndex> = self.in_nodes(node, Some(EdgeType::Control)).into();
        let mut visited = FxHashSet::default();
        visited.insert(node);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if self.node(current).is_entry_node() {
                return Some(current);
            }
            queue.extend(self.in_nodes(current, Some(EdgeType::Control)));
        }
        None
    }

    /// Nearest object entry above `node` over CONTROL edges: either a node
    /// flagged as an object-entry root, or the object entry linked from an
    /// ancestor's construct. Ignores the cache.
    pub fn enclosing_object_entry(&self, node: NodeIndex) -> Option<NodeIndex> {
        let mut queue: VecDeque<NodeIndex> = self.in_nodes(node, Some(EdgeType::Control)).into();
        let mut visited = FxHashSet::default();
        visited.insert(node);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let candidate = self.node(current);
            if candidate.is_object_entry_root {
                return Some(current);
            }
            if let Some(linked) = candidate.construct().and_then(|c| c.object_entry()) {
                return Some(linked);
            }
            queue.extend(self.in_nodes(current, Some(EdgeType::Control)));
        }
        None
    }

    /// Cached variant of [`Self::enclosing_object_entry`]
    pub fn resolve_enclosing_object_entry(&mut self, node: NodeIndex) -> Option<NodeIndex> {
        if let Some(cached) = self.node(node).memo().object_entry {
            return Some(cached);
        }
        let found = self.enclosing_object_entry(node);
        if found.is_some() {
            self.node_mut(node).memo.object_entry = found;
        }
        found
    }

    /// Distinct call nodes below `node` over CONTROL edges
    pub fn find_call_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut queue: VecDeque<NodeIndex> = self.out_nodes(node, Some(EdgeType::Control)).into();
        let mut visited = FxHashSet::default();
        visited.insert(node);
        let mut calls = Vec::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if self.node(current).is_call_node() {
                calls.push(current);
            }
            queue.extend(self.out_nodes(current, Some(EdgeType::Control)));
        }
        calls
    }
}
