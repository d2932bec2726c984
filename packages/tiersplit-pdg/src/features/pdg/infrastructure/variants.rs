//! Variant-specific operations
//!
//! Entry, object entry, call and actual-parameter accessors layered over the
//! generic adjacency queries. Mutations that only make sense for one variant
//! return `KindMismatch` when applied to another.

use crate::errors::{PdgError, Result};
use crate::features::pdg::domain::{Arity, EdgeType, NodeKind, ParamDirection, Tier};
use crate::features::pdg::infrastructure::pdg::ProgramDependenceGraph;
use crate::shared::models::ConstructId;
use petgraph::graph::NodeIndex;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::{trace, warn};

fn push_unique(out: &mut Vec<NodeIndex>, seen: &mut FxHashSet<NodeIndex>, node: NodeIndex) {
    if seen.insert(node) {
        out.push(node);
    }
}

impl ProgramDependenceGraph {
    fn expect_entry(&self, node: NodeIndex) -> Result<()> {
        match self.node(node).entry_data() {
            Some(_) => Ok(()),
            None => Err(PdgError::kind_mismatch(
                self.node(node).id.clone(),
                "entry",
                self.node(node).kind.label(),
            )),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Entry
    // ═══════════════════════════════════════════════════════════════════════

    /// Formal-in parameters in declaration (edge creation) order
    pub fn formal_in(&self, entry: NodeIndex) -> Vec<NodeIndex> {
        self.filter_out_nodes(entry, |n| {
            n.is_formal_node() && n.direction() == Some(ParamDirection::In)
        })
    }

    /// Formal-out parameters, plus the formals fed by every registered
    /// exception exit
    pub fn formal_out(&self, entry: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = FxHashSet::default();
        let mut outs = Vec::new();
        for node in self.filter_out_nodes(entry, |n| {
            n.is_formal_node() && n.direction() == Some(ParamDirection::Out)
        }) {
            push_unique(&mut outs, &mut seen, node);
        }

        let exits = self
            .node(entry)
            .entry_data()
            .map(|data| data.exc_exits.clone())
            .unwrap_or_default();
        for exit in exits {
            for node in self.filter_out_nodes(exit, |n| n.is_formal_node()) {
                push_unique(&mut outs, &mut seen, node);
            }
        }
        outs
    }

    /// Register an exception exit on an entry
    pub fn add_exc_exit(&mut self, entry: NodeIndex, exit: NodeIndex) -> Result<()> {
        if !self.node(exit).is_exit_node() {
            return Err(PdgError::kind_mismatch(
                self.node(exit).id.clone(),
                "exit",
                self.node(exit).kind.label(),
            ));
        }
        self.expect_entry(entry)?;
        if let Some(data) = self.node_mut(entry).entry_data_mut() {
            if !data.exc_exits.contains(&exit) {
                data.exc_exits.push(exit);
            }
        }
        Ok(())
    }

    pub fn set_is_constructor(&mut self, entry: NodeIndex, is_constructor: bool) -> Result<()> {
        self.expect_entry(entry)?;
        if let Some(data) = self.node_mut(entry).entry_data_mut() {
            data.is_constructor = is_constructor;
        }
        Ok(())
    }

    pub fn has_body(&self, entry: NodeIndex) -> bool {
        self.out_nodes(entry, None)
            .into_iter()
            .any(|n| self.node(n).is_statement_node())
    }

    /// Statements, calls, object entries and nested entries under `entry`.
    ///
    /// Follows CONTROL and OBJMEMBER edges; a property statement also
    /// contributes the entries it is bound to over DATA.
    pub fn body(&self, entry: NodeIndex) -> Vec<NodeIndex> {
        let mut queue: VecDeque<NodeIndex> = self.out_nodes(entry, Some(EdgeType::Control)).into();
        let mut visited = FxHashSet::default();
        visited.insert(entry);
        let mut body = Vec::new();

        while let Some(target) = queue.pop_front() {
            if !visited.insert(target) {
                continue;
            }
            let node = self.node(target);
            if !(node.is_statement_node()
                || node.is_call_node()
                || node.is_object_entry()
                || node.is_entry_node())
            {
                continue;
            }
            body.push(target);
            queue.extend(self.out_nodes(target, Some(EdgeType::Control)));
            queue.extend(self.out_nodes(target, Some(EdgeType::ObjMember)));
            let is_property = node.construct().map_or(false, |c| c.is_property());
            if node.is_statement_node() && is_property {
                queue.extend(
                    self.out_nodes(target, Some(EdgeType::Data))
                        .into_iter()
                        .filter(|&n| self.node(n).is_entry_node()),
                );
            }
        }
        body
    }

    /// Record a call site reaching `entry`; the caller's tier picks the counter
    pub fn add_call(&mut self, entry: NodeIndex, call: NodeIndex) -> Result<()> {
        self.expect_entry(entry)?;
        let caller_tier = self.get_tier(call);
        if let Some(data) = self.node_mut(entry).entry_data_mut() {
            data.is_called = true;
            match caller_tier {
                Some(Tier::Server) => data.server_calls_nr += 1,
                Some(Tier::Client) => data.client_calls_nr += 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Callers over CALL, and also REMOTEC when `remote`
    pub fn calls(&self, entry: NodeIndex, remote: bool) -> Vec<NodeIndex> {
        let mut callers = self.in_nodes(entry, Some(EdgeType::Call));
        if remote {
            callers.extend(self.in_nodes(entry, Some(EdgeType::RemoteCall)));
        }
        callers
    }

    fn count_callers_on(&mut self, entry: NodeIndex, tier: Tier) -> usize {
        let callers = self.calls(entry, true);
        callers
            .into_iter()
            .filter(|&call| self.get_tier(call) == Some(tier))
            .count()
    }

    /// Server-side callers over CALL + REMOTEC
    pub fn server_calls(&mut self, entry: NodeIndex) -> usize {
        self.count_callers_on(entry, Tier::Server)
    }

    /// Client-side callers over CALL + REMOTEC
    pub fn client_calls(&mut self, entry: NodeIndex) -> usize {
        self.count_callers_on(entry, Tier::Client)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Object entry
    // ═══════════════════════════════════════════════════════════════════════

    /// Member lookup, delegating along the PROTOTYPE chain
    pub fn member(&self, object: NodeIndex, name: &str) -> Option<NodeIndex> {
        let mut visited = FxHashSet::default();
        let mut current = object;
        loop {
            if !visited.insert(current) {
                warn!("prototype cycle at {} looking up '{}'", self.node(current), name);
                return None;
            }
            if let NodeKind::ObjectEntry(data) = &self.node(current).kind {
                if let Some(&found) = data.members.get(name) {
                    return Some(found);
                }
            }
            current = self
                .out_nodes(current, Some(EdgeType::Prototype))
                .into_iter()
                .next()?;
        }
    }

    /// Bind `name` to `member` and add the OBJMEMBER edge
    pub fn add_member(&mut self, object: NodeIndex, name: &str, member: NodeIndex) -> Result<()> {
        if !self.node(object).is_object_entry() {
            return Err(PdgError::kind_mismatch(
                self.node(object).id.clone(),
                "object entry",
                self.node(object).kind.label(),
            ));
        }
        self.add_edge_out(object, member, EdgeType::ObjMember, None);
        if let NodeKind::ObjectEntry(data) = &mut self.node_mut(object).kind {
            data.members.insert(name.to_string(), member);
        }
        trace!("member '{}' added", name);
        Ok(())
    }

    pub fn set_constructor_node(&mut self, object: NodeIndex, constructor: NodeIndex) -> Result<()> {
        match &mut self.node_mut(object).kind {
            NodeKind::ObjectEntry(data) => {
                data.constructor_node = Some(constructor);
                Ok(())
            }
            other => {
                let found = other.label();
                Err(PdgError::kind_mismatch(
                    self.node(object).id.clone(),
                    "object entry",
                    found,
                ))
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Call
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_call_arity(&mut self, call: NodeIndex, arity: Arity) -> Result<()> {
        match &mut self.node_mut(call).kind {
            NodeKind::Call { arity: slot } => {
                *slot = Some(arity);
                Ok(())
            }
            other => {
                let found = other.label();
                Err(PdgError::kind_mismatch(self.node(call).id.clone(), "call", found))
            }
        }
    }

    /// Actual-in parameters in argument order
    pub fn actual_in(&self, call: NodeIndex) -> Vec<NodeIndex> {
        self.filter_out_nodes(call, |n| {
            n.is_actual_p_node() && n.direction() == Some(ParamDirection::In)
        })
    }

    /// Values returned to the call site: actual-out parameters, whatever
    /// the call's exits feed, and the actual parameters of catch clauses
    pub fn actual_out(&self, call: NodeIndex) -> Vec<NodeIndex> {
        let mut outs = self.filter_out_nodes(call, |n| {
            n.is_actual_p_node() && n.direction() == Some(ParamDirection::Out)
        });

        for exit in self.filter_out_nodes(call, |n| n.is_exit_node()) {
            outs.extend(self.out_nodes(exit, None));
        }

        let catches = self.filter_out_nodes(call, |n| {
            n.is_statement_node() && n.construct().map_or(false, |c| c.is_catch_stm())
        });
        for catch in catches {
            outs.extend(self.filter_out_nodes(catch, |n| n.is_actual_p_node()));
        }
        outs
    }

    /// Callees over CALL / REMOTEC
    pub fn entry_nodes(&self, call: NodeIndex) -> Vec<NodeIndex> {
        self.out_edges(call, None)
            .into_iter()
            .filter(|e| e.edge_type.is_call() && self.node(e.to).is_entry_node())
            .map(|e| e.to)
            .collect()
    }

    /// Statements that anchor `call`.
    ///
    /// A call used as an argument defers to the statement of the call it
    /// feeds; try statements never anchor. A call with no anchor is its own.
    pub fn stm_nodes(&self, call: NodeIndex) -> Vec<NodeIndex> {
        let limit = self.config().call_chain_limit;
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        let mut frontier = vec![call];
        let mut depth = 0;

        while !frontier.is_empty() {
            if depth > limit {
                warn!(
                    "statement lookup from {} exceeded {} levels",
                    self.node(call),
                    limit
                );
                for node in frontier {
                    push_unique(&mut result, &mut seen, node);
                }
                break;
            }
            depth += 1;

            let mut next = Vec::new();
            for current in frontier {
                let controls = self.in_nodes(current, Some(EdgeType::Control));
                let outer_calls: Vec<NodeIndex> = controls
                    .iter()
                    .filter(|&&n| self.node(n).is_actual_p_node())
                    .flat_map(|&arg| self.call_of(arg))
                    .collect();

                if !outer_calls.is_empty() {
                    next.extend(outer_calls);
                    continue;
                }

                let anchors: Vec<NodeIndex> = controls
                    .into_iter()
                    .filter(|&n| {
                        let node = self.node(n);
                        node.is_statement_node() && !node.construct().map_or(false, |c| c.is_try_stm())
                    })
                    .collect();
                if anchors.is_empty() {
                    push_unique(&mut result, &mut seen, current);
                } else {
                    for anchor in anchors {
                        push_unique(&mut result, &mut seen, anchor);
                    }
                }
            }
            frontier = next;
        }
        result
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Actual parameter
    // ═══════════════════════════════════════════════════════════════════════

    pub fn is_actual_in(&self, param: NodeIndex) -> bool {
        let node = self.node(param);
        node.is_actual_p_node() && node.direction() == Some(ParamDirection::In)
    }

    pub fn is_actual_out(&self, param: NodeIndex) -> bool {
        let node = self.node(param);
        node.is_actual_p_node() && node.direction() == Some(ParamDirection::Out)
    }

    /// Calls this parameter is the result of (CONTROL out-edges to calls)
    pub fn call_argument(&self, param: NodeIndex) -> Vec<NodeIndex> {
        self.out_nodes(param, Some(EdgeType::Control))
            .into_iter()
            .filter(|&n| self.node(n).is_call_node())
            .collect()
    }

    /// Calls owning this parameter (CONTROL in-edges from calls)
    pub fn call_of(&self, param: NodeIndex) -> Vec<NodeIndex> {
        self.in_nodes(param, Some(EdgeType::Control))
            .into_iter()
            .filter(|&n| self.node(n).is_call_node())
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Declarations
    // ═══════════════════════════════════════════════════════════════════════

    /// Whether `node` reads a variable-declaration statement whose first
    /// declarator is `declarator`
    pub fn compare_declaration_nodes(&self, declarator: ConstructId, node: NodeIndex) -> bool {
        self.in_nodes(node, Some(EdgeType::Data)).into_iter().any(|n| {
            let source = self.node(n);
            source.is_statement_node()
                && source.construct().map_or(false, |c| {
                    (c.is_var_decl() || c.is_var_declarator())
                        && c.declarations().first() == Some(&declarator)
                })
        })
    }
}
