//! Tier and functionality classification
//!
//! A node's tier comes from the nearest slice root above it. The search
//! walks incoming edges backward, but only those edges that carry
//! provenance (see [`ProgramDependenceGraph::follows_provenance`]).
//!
//! Pure queries (`classify_ftype`, `functionality`, `tier_of`) never write.
//! The `get_*` / `is_*_node` entry points cache declared results on the node;
//! `invalidate` forgets them.

use crate::features::pdg::domain::{
    ftype_equals, EdgeType, FType, FTypeResolution, ParamDirection, PdgEdgeRef, PdgNode, Tier,
};
use crate::features::pdg::infrastructure::pdg::ProgramDependenceGraph;
use petgraph::graph::NodeIndex;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::{debug, warn};

impl ProgramDependenceGraph {
    /// Whether the backward provenance search may cross `edge`
    pub fn follows_provenance(&self, edge: &PdgEdgeRef) -> bool {
        if edge.is_cycle() {
            return false;
        }
        let from = self.node(edge.from);
        let to = self.node(edge.to);
        let from_c = from.construct();
        let to_c = to.construct();

        if let (Some(f), Some(t)) = (from_c, to_c) {
            // var x = function () {}, x: function () {}, x = function () {}
            if t.is_fun_exp()
                && (f.is_var_declarator() || f.is_var_decl() || f.is_property() || f.is_assignment_stm())
            {
                return true;
            }

            // var x = {} / new C(), or x = ...: only the bound right-hand side
            if (t.is_obj_exp() || t.is_new_exp()) && (f.is_var_declarator() || f.is_assignment_stm()) {
                let id = t.construct_id();
                return f.init() == Some(id) || f.expression_right() == Some(id);
            }

            if (t.is_obj_exp() || t.is_new_exp())
                && (f.is_var_decl() || f.is_property())
            {
                return true;
            }

            if to.is_object_entry() && f.is_var_declarator() && f.init() == Some(t.construct_id()) {
                return true;
            }
        }

        if from.is_actual_p_node() && to.is_call_node() {
            return from.direction() != Some(ParamDirection::Out);
        }
        // Call used as an argument
        if to.is_actual_p_node() && from.is_call_node() {
            return true;
        }

        edge.equals_type(EdgeType::Control) || edge.equals_type(EdgeType::ObjMember)
    }

    /// Backward BFS over provenance edges until `stop` accepts a node or a
    /// root is reached. Returns the last node dequeued.
    fn provenance_search<F>(&self, origin: NodeIndex, stop: F) -> Option<NodeIndex>
    where
        F: Fn(&PdgNode) -> bool,
    {
        let limit = self.config().worklist_limit;
        let mut queue: VecDeque<PdgEdgeRef> = self
            .in_edges(origin, None)
            .into_iter()
            .filter(|e| self.follows_provenance(e))
            .collect();
        let mut visited = FxHashSet::default();
        visited.insert(origin);
        let mut last = None;
        let mut pops = 0usize;

        while let Some(edge) = queue.pop_front() {
            pops += 1;
            if pops > limit {
                warn!("provenance search from {} hit worklist limit {}", self.node(origin), limit);
                break;
            }

            let node = edge.from;
            last = Some(node);
            visited.insert(node);
            let current = self.node(node);
            if stop(current) || current.is_root {
                break;
            }

            queue.extend(
                self.in_edges(node, None)
                    .into_iter()
                    .filter(|e| self.follows_provenance(e) && !visited.contains(&e.from)),
            );
        }
        last
    }

    /// Functionality tag of `node` from the nearest slice root, computed
    /// without reading or writing any cache
    pub fn classify_ftype(&self, node: NodeIndex) -> FTypeResolution {
        if let Some(data) = self.node(node).functionality_data() {
            return FTypeResolution::Declared(data.ftype.clone());
        }
        // other nodes' memos are never consulted: the answer depends on
        // the graph alone, not on query order
        match self.provenance_search(node, PdgNode::is_slice_node) {
            Some(last) => match self.node(last).functionality_data() {
                Some(data) => FTypeResolution::Declared(data.ftype.clone()),
                None => FTypeResolution::Undetermined,
            },
            None => FTypeResolution::Unset,
        }
    }

    /// Memoizing classification; `recheck` ignores a cached tag
    pub fn resolve_ftype(&mut self, node: NodeIndex, recheck: bool) -> FTypeResolution {
        if let Some(data) = self.node(node).functionality_data() {
            return FTypeResolution::Declared(data.ftype.clone());
        }
        if !recheck {
            if let Some(cached) = &self.node(node).memo().ftype {
                return FTypeResolution::Declared(cached.clone());
            }
        }

        let resolution = self.classify_ftype(node);
        match &resolution {
            FTypeResolution::Declared(ftype) => {
                self.node_mut(node).memo.ftype = Some(ftype.clone());
            }
            FTypeResolution::Undetermined => {
                if self.config().warn_on_undetermined {
                    warn!("no slice root above {}, defaulting to shared", self.node(node));
                } else {
                    debug!("no slice root above {}, defaulting to shared", self.node(node));
                }
            }
            FTypeResolution::Unset => {}
        }
        resolution
    }

    /// Functionality tag; an undetermined tag reads as shared
    pub fn get_ftype(&mut self, node: NodeIndex, recheck: bool) -> Option<FType> {
        self.resolve_ftype(node, recheck).ftype()
    }

    /// Nearest slice root above `node` (the node itself when it is one)
    pub fn functionality(&self, node: NodeIndex) -> Option<NodeIndex> {
        if self.node(node).is_slice_node() {
            return Some(node);
        }
        self.provenance_search(node, PdgNode::is_slice_node)
            .filter(|&last| self.node(last).is_slice_node())
    }

    /// Tier declared by the nearest slice root, without caching
    pub fn tier_of(&self, node: NodeIndex) -> Option<Tier> {
        self.functionality(node)
            .and_then(|slice| self.node(slice).functionality_data())
            .and_then(|data| data.tier)
    }

    /// Memoizing tier lookup; an absent tier is cached too
    pub fn get_tier(&mut self, node: NodeIndex) -> Option<Tier> {
        if let Some(cached) = self.node(node).memo().tier {
            return cached;
        }
        let tier = self.tier_of(node);
        self.node_mut(node).memo.tier = Some(tier);
        tier
    }

    pub fn is_client_node(&mut self, node: NodeIndex) -> bool {
        self.get_tier(node) == Some(Tier::Client)
    }

    pub fn is_server_node(&mut self, node: NodeIndex) -> bool {
        self.get_tier(node) == Some(Tier::Server)
    }

    /// No tier, no tag, or explicitly shared
    pub fn is_shared_node(&mut self, node: NodeIndex) -> bool {
        let tier = self.get_tier(node);
        let ftype = self.get_ftype(node, false);
        tier.is_none() || ftype.is_none() || tier == Some(Tier::Shared)
    }

    /// Same tag, or both shared
    pub fn equals_functionality(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        let fa = self.get_ftype(a, false);
        let fb = self.get_ftype(b, false);
        let same = match (&fa, &fb) {
            (Some(x), Some(y)) => ftype_equals(x, y),
            (None, None) => true,
            _ => false,
        };
        same || (self.is_shared_node(a) && self.is_shared_node(b))
    }

    /// Both nodes have a set tier, and it is the same one
    pub fn equals_tier(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        match (self.get_tier(a), self.get_tier(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}
