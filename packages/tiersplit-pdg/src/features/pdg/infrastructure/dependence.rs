//! Interprocedural data-dependence closure
//!
//! Worklist over DATA edges starting at one node. Parameter nodes are the
//! call boundary: an actual parameter resumes the closure at the call it
//! feeds (climbing out of nested call arguments first), a call resolves to
//! the node that invokes it, and a formal parameter is only crossed when it
//! is reached straight from an actual parameter.

use crate::errors::{PdgError, Result};
use crate::features::pdg::domain::{EdgeType, PdgEdgeRef};
use crate::features::pdg::infrastructure::pdg::ProgramDependenceGraph;
use petgraph::graph::{EdgeIndex, NodeIndex};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Result accumulator: insertion ordered, origin never included
struct Closure {
    origin: NodeIndex,
    members: FxHashSet<NodeIndex>,
    order: Vec<NodeIndex>,
}

impl Closure {
    fn new(origin: NodeIndex) -> Self {
        let mut members = FxHashSet::default();
        members.insert(origin);
        Closure {
            origin,
            members,
            order: Vec::new(),
        }
    }

    fn contains(&self, node: NodeIndex) -> bool {
        self.members.contains(&node)
    }

    fn add(&mut self, node: NodeIndex) -> bool {
        if node == self.origin || !self.members.insert(node) {
            return false;
        }
        self.order.push(node);
        true
    }
}

struct Worklist {
    queue: VecDeque<PdgEdgeRef>,
    seen: FxHashSet<EdgeIndex>,
}

impl Worklist {
    fn push_all(&mut self, edges: impl IntoIterator<Item = PdgEdgeRef>) {
        for edge in edges {
            if self.seen.insert(edge.index) {
                self.queue.push_back(edge);
            }
        }
    }
}

impl ProgramDependenceGraph {
    fn first_control_source(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.in_edges(node, Some(EdgeType::Control))
            .first()
            .map(|e| e.from)
    }

    /// Actual parameters `call` is nested under (call used as an argument)
    fn argument_slots(&self, call: NodeIndex) -> Vec<NodeIndex> {
        self.in_nodes(call, Some(EdgeType::Control))
            .into_iter()
            .filter(|&n| self.node(n).is_actual_p_node())
            .collect()
    }

    /// Outermost call of a chain of calls nested as arguments, e.g. the
    /// outer `foo` in `foo(foo(42))`
    pub fn outermost_call(&self, call: NodeIndex) -> Result<NodeIndex> {
        let limit = self.config().call_chain_limit;
        let mut visited = FxHashSet::default();
        visited.insert(call);
        let mut upcall = call;

        for _ in 0..limit {
            let Some(&uparg) = self.argument_slots(upcall).first() else {
                return Ok(upcall);
            };
            let Some(next) = self.call_of(uparg).first().copied() else {
                return Ok(upcall);
            };
            if !visited.insert(next) {
                break;
            }
            upcall = next;
        }

        if self.argument_slots(upcall).is_empty() {
            return Ok(upcall);
        }
        Err(PdgError::CallChainLimit {
            start: self.node(call).id.clone(),
            limit,
        })
    }

    /// Nodes whose value depends on `origin`, in discovery order, without
    /// `origin` and without duplicates.
    ///
    /// `cross_tier` also seeds REMOTED edges; `include_actual_params` keeps
    /// actual parameters in the result instead of stepping over them.
    pub fn data_dependent_nodes(
        &self,
        origin: NodeIndex,
        cross_tier: bool,
        include_actual_params: bool,
    ) -> Vec<NodeIndex> {
        let limit = self.config().worklist_limit;
        let seeds: Vec<PdgEdgeRef> = self
            .out_edges(origin, None)
            .into_iter()
            .filter(|e| {
                e.equals_type(EdgeType::Data) || (cross_tier && e.equals_type(EdgeType::RemoteData))
            })
            .collect();
        let mut work = Worklist {
            queue: VecDeque::new(),
            seen: FxHashSet::default(),
        };
        work.push_all(seeds);
        let mut closure = Closure::new(origin);
        let mut pops = 0usize;

        while let Some(edge) = work.queue.pop_front() {
            pops += 1;
            if pops > limit {
                warn!("dependence closure from {} hit worklist limit {}", self.node(origin), limit);
                break;
            }

            let to = edge.to;
            let target = self.node(to);

            if target.is_actual_p_node() {
                if include_actual_params {
                    closure.add(to);
                    continue;
                }
                let Some(callnode) = self.first_control_source(to) else {
                    continue;
                };
                if self.argument_slots(callnode).is_empty() {
                    continue;
                }
                match self.outermost_call(callnode) {
                    Ok(upcall) => {
                        work.push_all(self.out_edges(upcall, Some(EdgeType::Data)));
                        let upedges = self.in_edges(callnode, Some(EdgeType::Control));
                        if upedges.is_empty() {
                            closure.add(callnode);
                        } else {
                            work.push_all(upedges);
                        }
                    }
                    Err(err) => {
                        warn!("{}; keeping {}", err, self.node(callnode));
                        closure.add(callnode);
                    }
                }
            } else if target.is_call_node() {
                match self.first_control_source(to) {
                    Some(upnode)
                        if !self.node(upnode).is_entry_node() && !closure.contains(upnode) =>
                    {
                        closure.add(upnode);
                        work.push_all(self.out_edges(upnode, Some(EdgeType::Data)));
                    }
                    _ => {
                        closure.add(to);
                    }
                }
            } else if target.is_formal_node() {
                // Argument binding into the callee
                if self.node(edge.from).is_actual_p_node() && closure.add(to) {
                    work.push_all(self.out_edges(to, Some(EdgeType::Data)));
                }
            } else if closure.add(to) {
                work.push_all(self.out_edges(to, Some(EdgeType::Data)));
            }
        }

        debug!(
            "dependence closure from {}: {} node(s)",
            self.node(origin),
            closure.order.len()
        );
        closure.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::features::pdg::domain::ParamDirection;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_direct_call_dependence() {
        // function foo(x) { return x; }  foo(42)
        let mut pdg = ProgramDependenceGraph::new();
        let e1 = pdg.new_entry_node(None);
        let f1_in = pdg.new_formal_parameter("x", ParamDirection::In);
        let ex1 = pdg.new_exit_node(None, false);
        pdg.add_edge_out(e1, f1_in, EdgeType::Control, None);
        pdg.add_edge_out(e1, ex1, EdgeType::Control, None);
        pdg.add_edge_out(f1_in, ex1, EdgeType::Data, None);

        let c1 = pdg.new_call_node(None);
        let a1_in = pdg.new_actual_parameter(ParamDirection::In, None, Some("42".into()));
        pdg.add_edge_out(c1, a1_in, EdgeType::Control, None);
        pdg.add_edge_out(a1_in, f1_in, EdgeType::Data, None);
        pdg.add_edge_out(c1, e1, EdgeType::Call, None);

        let deps = pdg.data_dependent_nodes(a1_in, false, false);
        assert_eq!(deps, vec![f1_in, ex1]);
    }

    #[test]
    fn test_formal_reached_from_statement_is_skipped() {
        let mut pdg = ProgramDependenceGraph::new();
        let s = pdg.new_statement_node(None);
        let f = pdg.new_formal_parameter("x", ParamDirection::In);
        let after = pdg.new_statement_node(None);
        pdg.add_edge_out(s, f, EdgeType::Data, None);
        pdg.add_edge_out(f, after, EdgeType::Data, None);

        assert!(pdg.data_dependent_nodes(s, false, false).is_empty());
    }

    #[test]
    fn test_nested_call_argument_reaches_outer_call() {
        // s: r = foo(foo(v))
        let mut pdg = ProgramDependenceGraph::new();
        let v = pdg.new_statement_node(None);
        let s = pdg.new_statement_node(None);
        let outer = pdg.new_call_node(None);
        let outer_arg = pdg.new_actual_parameter(ParamDirection::In, None, None);
        let inner = pdg.new_call_node(None);
        let inner_arg = pdg.new_actual_parameter(ParamDirection::In, None, None);
        let use_r = pdg.new_statement_node(None);
        pdg.add_edge_out(s, outer, EdgeType::Control, None);
        pdg.add_edge_out(outer, outer_arg, EdgeType::Control, None);
        pdg.add_edge_out(outer_arg, inner, EdgeType::Control, None);
        pdg.add_edge_out(inner, inner_arg, EdgeType::Control, None);
        pdg.add_edge_out(v, inner_arg, EdgeType::Data, None);
        pdg.add_edge_out(outer, use_r, EdgeType::Data, None);

        assert_eq!(pdg.outermost_call(inner).unwrap(), outer);
        let deps = pdg.data_dependent_nodes(v, false, false);
        assert_eq!(deps, vec![use_r, outer_arg]);

        let with_params = pdg.data_dependent_nodes(v, false, true);
        assert_eq!(with_params, vec![inner_arg]);
    }

    #[test]
    fn test_call_resolves_to_invoking_statement() {
        let mut pdg = ProgramDependenceGraph::new();
        let x = pdg.new_statement_node(None);
        let s = pdg.new_statement_node(None);
        let call = pdg.new_call_node(None);
        let after = pdg.new_statement_node(None);
        pdg.add_edge_out(s, call, EdgeType::Control, None);
        pdg.add_edge_out(x, call, EdgeType::Data, None);
        pdg.add_edge_out(s, after, EdgeType::Data, None);

        assert_eq!(pdg.data_dependent_nodes(x, false, false), vec![s, after]);
    }

    #[test]
    fn test_call_directly_under_entry_is_kept() {
        let mut pdg = ProgramDependenceGraph::new();
        let e = pdg.new_entry_node(None);
        let x = pdg.new_statement_node(None);
        let call = pdg.new_call_node(None);
        pdg.add_edge_out(e, call, EdgeType::Control, None);
        pdg.add_edge_out(x, call, EdgeType::Data, None);

        assert_eq!(pdg.data_dependent_nodes(x, false, false), vec![call]);
    }

    #[test]
    fn test_cycle_back_to_origin_excluded() {
        let mut pdg = ProgramDependenceGraph::new();
        let a = pdg.new_statement_node(None);
        let b = pdg.new_statement_node(None);
        let c = pdg.new_statement_node(None);
        pdg.add_edge_out(a, b, EdgeType::Data, None);
        pdg.add_edge_out(b, c, EdgeType::Data, None);
        pdg.add_edge_out(c, a, EdgeType::Data, None);
        pdg.add_edge_out(c, b, EdgeType::Data, None);

        assert_eq!(pdg.data_dependent_nodes(a, false, false), vec![b, c]);
    }

    #[test]
    fn test_cross_tier_seeds_remote_data() {
        let mut pdg = ProgramDependenceGraph::new();
        let a = pdg.new_statement_node(None);
        let remote = pdg.new_statement_node(None);
        pdg.add_edge_out(a, remote, EdgeType::RemoteData, None);

        assert!(pdg.data_dependent_nodes(a, false, false).is_empty());
        assert_eq!(pdg.data_dependent_nodes(a, true, false), vec![remote]);
    }

    #[test]
    fn test_call_chain_limit() {
        let config = AnalysisConfig::default().call_chain_limit(1);
        let mut pdg = ProgramDependenceGraph::with_config(config).unwrap();
        let c1 = pdg.new_call_node(None);
        let a1 = pdg.new_actual_parameter(ParamDirection::In, None, None);
        let c2 = pdg.new_call_node(None);
        let a2 = pdg.new_actual_parameter(ParamDirection::In, None, None);
        let c3 = pdg.new_call_node(None);
        pdg.add_edge_out(c1, a1, EdgeType::Control, None);
        pdg.add_edge_out(a1, c2, EdgeType::Control, None);
        pdg.add_edge_out(c2, a2, EdgeType::Control, None);
        pdg.add_edge_out(a2, c3, EdgeType::Control, None);

        assert!(matches!(
            pdg.outermost_call(c3),
            Err(PdgError::CallChainLimit { limit: 1, .. })
        ));
    }

    #[test]
    fn test_call_chain_cycle_is_reported() {
        let mut pdg = ProgramDependenceGraph::new();
        let c1 = pdg.new_call_node(None);
        let a1 = pdg.new_actual_parameter(ParamDirection::In, None, None);
        let c2 = pdg.new_call_node(None);
        let a2 = pdg.new_actual_parameter(ParamDirection::In, None, None);
        pdg.add_edge_out(c1, a1, EdgeType::Control, None);
        pdg.add_edge_out(a1, c2, EdgeType::Control, None);
        pdg.add_edge_out(c2, a2, EdgeType::Control, None);
        pdg.add_edge_out(a2, c1, EdgeType::Control, None);
        let v = pdg.new_statement_node(None);
        let a3 = pdg.new_actual_parameter(ParamDirection::In, None, None);
        pdg.add_edge_out(c1, a3, EdgeType::Control, None);
        pdg.add_edge_out(v, a3, EdgeType::Data, None);

        assert!(pdg.outermost_call(c1).is_err());
        // closure still terminates and keeps the call conservatively
        assert_eq!(pdg.data_dependent_nodes(v, false, false), vec![c1]);
    }
}
