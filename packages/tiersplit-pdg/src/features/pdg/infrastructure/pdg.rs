/*
 * Distributed PDG Module
 *
 * One arena per compiled source unit:
 * - petgraph StableDiGraph: node/edge indices survive edge removal
 * - one edge record per relation, visible from both endpoints
 * - kind-prefixed string ids from a counter owned by the graph
 * - adjacency reported in edge creation order
 *
 * Nodes are never removed. Edges may be added or removed by the rewrite
 * pass between analyses.
 */

use crate::config::AnalysisConfig;
use crate::errors::{PdgError, Result};
use crate::features::pdg::domain::{
    EdgeType, FType, FunctionalityData, NodeKind, ParamDirection, PdgEdge, PdgEdgeRef, PdgNode,
    Tier,
};
use crate::shared::models::SourceConstruct;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Serializable node summary
#[derive(Debug, Clone, serde::Serialize)]
pub struct NodeDto {
    pub id: String,
    pub cnt: u64,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ftype: Option<FType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

/// Serializable edge
#[derive(Debug, Clone, serde::Serialize)]
pub struct EdgeDto {
    pub from: String,
    pub to: String,
    pub edge_type: EdgeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Serializable DTO for ProgramDependenceGraph (debug export)
#[derive(Debug, Clone, serde::Serialize)]
pub struct PdgDto {
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

/// Distributed program dependency graph
#[derive(Debug, Clone)]
pub struct ProgramDependenceGraph {
    /// petgraph directed graph
    graph: StableDiGraph<PdgNode, PdgEdge>,
    /// Node ID to petgraph NodeIndex mapping
    node_map: HashMap<String, NodeIndex>,
    /// Creation counter; also the numeric part of generated ids
    counter: u64,
    edge_seq: u64,
    config: AnalysisConfig,
}

// Custom serde implementation via DTO
impl serde::Serialize for ProgramDependenceGraph {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_dto().serialize(serializer)
    }
}

impl ProgramDependenceGraph {
    /// Create new empty PDG with the default analysis configuration
    pub fn new() -> Self {
        ProgramDependenceGraph {
            graph: StableDiGraph::default(),
            node_map: HashMap::new(),
            counter: 0,
            edge_seq: 0,
            config: AnalysisConfig::default(),
        }
    }

    /// Create new empty PDG with a validated configuration
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let mut pdg = Self::new();
        pdg.config = config;
        Ok(pdg)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Node construction
    // ═══════════════════════════════════════════════════════════════════════

    fn next_cnt(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn push_node(
        &mut self,
        id: String,
        cnt: u64,
        kind: NodeKind,
        construct: Option<Arc<dyn SourceConstruct>>,
    ) -> Result<NodeIndex> {
        if self.node_map.contains_key(&id) {
            return Err(PdgError::DuplicateNode(id));
        }
        trace!("pdg node {} ({})", id, kind.label());
        let idx = self
            .graph
            .add_node(PdgNode::new(id.clone(), cnt, kind, construct));
        self.node_map.insert(id, idx);
        Ok(idx)
    }

    /// Counter-generated ids cannot collide: the prefixes are disjoint and
    /// the counter only grows
    fn push_counted(
        &mut self,
        prefix: &str,
        suffix: &str,
        kind: NodeKind,
        construct: Option<Arc<dyn SourceConstruct>>,
    ) -> NodeIndex {
        let cnt = self.next_cnt();
        let id = format!("{}{}{}", prefix, cnt, suffix);
        trace!("pdg node {} ({})", id, kind.label());
        let idx = self
            .graph
            .add_node(PdgNode::new(id.clone(), cnt, kind, construct));
        self.node_map.insert(id, idx);
        idx
    }

    /// Entry node, `e<n>`
    pub fn new_entry_node(&mut self, construct: Option<Arc<dyn SourceConstruct>>) -> NodeIndex {
        self.push_counted("e", "", NodeKind::Entry(Default::default()), construct)
    }

    /// Object entry node, `o<n>`
    pub fn new_object_entry_node(
        &mut self,
        construct: Option<Arc<dyn SourceConstruct>>,
    ) -> NodeIndex {
        self.push_counted("o", "", NodeKind::ObjectEntry(Default::default()), construct)
    }

    /// Call node, `c<n>`
    pub fn new_call_node(&mut self, construct: Option<Arc<dyn SourceConstruct>>) -> NodeIndex {
        self.push_counted("c", "", NodeKind::Call { arity: None }, construct)
    }

    /// Statement node, `s<n>`
    pub fn new_statement_node(
        &mut self,
        construct: Option<Arc<dyn SourceConstruct>>,
    ) -> NodeIndex {
        self.push_counted("s", "", NodeKind::Statement, construct)
    }

    /// Formal parameter node, `f<n>_in` / `f<n>_out`
    pub fn new_formal_parameter(&mut self, name: &str, direction: ParamDirection) -> NodeIndex {
        let suffix = format!("_{}", direction.suffix());
        self.push_counted(
            "f",
            &suffix,
            NodeKind::FormalParameter {
                direction,
                name: name.to_string(),
            },
            None,
        )
    }

    /// Actual parameter node, `a<n>_in` / `a<n>_out`
    pub fn new_actual_parameter(
        &mut self,
        direction: ParamDirection,
        construct: Option<Arc<dyn SourceConstruct>>,
        value: Option<String>,
    ) -> NodeIndex {
        let suffix = format!("_{}", direction.suffix());
        self.push_counted(
            "a",
            &suffix,
            NodeKind::ActualParameter { direction, value },
            construct,
        )
    }

    /// Normal or exceptional exit node, `ex<n>`
    pub fn new_exit_node(
        &mut self,
        construct: Option<Arc<dyn SourceConstruct>>,
        exception: bool,
    ) -> NodeIndex {
        self.push_counted("ex", "", NodeKind::Exit { exception }, construct)
    }

    /// Slice root for an annotated block, `C<tag>`
    pub fn new_functionality_node(&mut self, ftype: FType, tier: Option<Tier>) -> Result<NodeIndex> {
        let id = format!("C{}", ftype);
        let cnt = self.next_cnt();
        self.push_node(
            id,
            cnt,
            NodeKind::Functionality(FunctionalityData {
                ftype,
                tier,
                distributed: false,
            }),
            None,
        )
    }

    /// Slice root for a tier annotation; tag and tier coincide
    pub fn new_distributed_node(&mut self, tier: Tier) -> Result<NodeIndex> {
        let ftype = FType::Tier(tier);
        let id = format!("C{}", ftype);
        let cnt = self.next_cnt();
        self.push_node(
            id,
            cnt,
            NodeKind::Functionality(FunctionalityData {
                ftype,
                tier: Some(tier),
                distributed: true,
            }),
            None,
        )
    }

    /// Existing slice root for `tier`, created on first use
    pub fn ensure_distributed(&mut self, tier: Tier) -> Result<NodeIndex> {
        match self.functionality_node(&FType::Tier(tier)) {
            Some(idx) => Ok(idx),
            None => self.new_distributed_node(tier),
        }
    }

    /// Slice root carrying `ftype`
    pub fn functionality_node(&self, ftype: &FType) -> Option<NodeIndex> {
        self.find(&format!("C{}", ftype))
            .filter(|&idx| self.graph[idx].is_slice_node())
    }

    /// Flag the program root; the provenance search stops there
    pub fn mark_root(&mut self, node: NodeIndex) {
        self.graph[node].is_root = true;
    }

    /// Flag a node as the root of an object literal / constructor body
    pub fn mark_object_entry_root(&mut self, node: NodeIndex) {
        self.graph[node].is_object_entry_root = true;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Node access
    // ═══════════════════════════════════════════════════════════════════════

    /// Node by handle. Handles come from this graph; a foreign handle panics.
    pub fn node(&self, idx: NodeIndex) -> &PdgNode {
        &self.graph[idx]
    }

    pub fn get_node(&self, idx: NodeIndex) -> Option<&PdgNode> {
        self.graph.node_weight(idx)
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIndex) -> &mut PdgNode {
        &mut self.graph[idx]
    }

    /// Handle by id
    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Handle by id; a missing id is a builder error
    pub fn require(&self, id: &str) -> Result<NodeIndex> {
        self.find(id)
            .ok_or_else(|| PdgError::UnknownNode(id.to_string()))
    }

    /// Node by id
    pub fn get_node_by_id(&self, id: &str) -> Option<&PdgNode> {
        self.find(id).map(|idx| &self.graph[idx])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node handles in creation order
    pub fn node_indices(&self) -> Vec<NodeIndex> {
        let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        indices.sort_by_key(|&idx| self.graph[idx].cnt);
        indices
    }

    /// Identity comparison
    pub fn same_node(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph[a].equals(&self.graph[b])
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Edge mutation
    // ═══════════════════════════════════════════════════════════════════════

    /// Add one edge `from -> to`; it is visible from both endpoints
    pub fn add_edge_out(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        edge_type: EdgeType,
        label: Option<&str>,
    ) -> EdgeIndex {
        self.edge_seq += 1;
        trace!(
            "pdg edge {} -{}-> {}",
            self.graph[from].id,
            edge_type,
            self.graph[to].id
        );
        self.graph.add_edge(
            from,
            to,
            PdgEdge::new(edge_type, label.map(str::to_string), self.edge_seq),
        )
    }

    /// Add `from -> target` for every `(target, type, label)`
    pub fn add_edges_out(
        &mut self,
        from: NodeIndex,
        tos: &[(NodeIndex, EdgeType, Option<&str>)],
    ) -> Vec<EdgeIndex> {
        tos.iter()
            .map(|&(to, edge_type, label)| self.add_edge_out(from, to, edge_type, label))
            .collect()
    }

    /// Add `source -> to` for every `(source, type)`
    pub fn add_edges_in(
        &mut self,
        to: NodeIndex,
        froms: &[(NodeIndex, EdgeType)],
    ) -> Vec<EdgeIndex> {
        froms
            .iter()
            .map(|&(from, edge_type)| self.add_edge_out(from, to, edge_type, None))
            .collect()
    }

    /// Remove edges `from -> to`; every type when `edge_type` is `None`.
    /// Returns the number of removed edges.
    pub fn remove_edge_out(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        edge_type: Option<EdgeType>,
    ) -> usize {
        let doomed: Vec<EdgeIndex> = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|e| e.target() == to)
            .filter(|e| edge_type.map_or(true, |t| e.weight().equals_type(t)))
            .map(|e| e.id())
            .collect();
        for &edge in &doomed {
            self.graph.remove_edge(edge);
        }
        if !doomed.is_empty() {
            trace!(
                "pdg removed {} edge(s) {} -> {}",
                doomed.len(),
                self.graph[from].id,
                self.graph[to].id
            );
        }
        doomed.len()
    }

    /// Remove edges `from -> to` seen from the target side
    pub fn remove_edge_in(
        &mut self,
        to: NodeIndex,
        from: NodeIndex,
        edge_type: Option<EdgeType>,
    ) -> usize {
        self.remove_edge_out(from, to, edge_type)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Edge queries
    // ═══════════════════════════════════════════════════════════════════════

    fn edges_directed(
        &self,
        node: NodeIndex,
        direction: Direction,
        edge_type: Option<EdgeType>,
    ) -> Vec<PdgEdgeRef> {
        let mut edges: Vec<(u64, PdgEdgeRef)> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| edge_type.map_or(true, |t| e.weight().equals_type(t)))
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e.id())?;
                Some((
                    e.weight().seq,
                    PdgEdgeRef {
                        index: e.id(),
                        from,
                        to,
                        edge_type: e.weight().edge_type,
                    },
                ))
            })
            .collect();
        edges.sort_unstable_by_key(|(seq, _)| *seq);
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    /// Incoming edges in creation order, optionally of one type
    pub fn in_edges(&self, node: NodeIndex, edge_type: Option<EdgeType>) -> Vec<PdgEdgeRef> {
        self.edges_directed(node, Direction::Incoming, edge_type)
    }

    /// Outgoing edges in creation order, optionally of one type
    pub fn out_edges(&self, node: NodeIndex, edge_type: Option<EdgeType>) -> Vec<PdgEdgeRef> {
        self.edges_directed(node, Direction::Outgoing, edge_type)
    }

    /// Edges in either direction
    pub fn edges(
        &self,
        node: NodeIndex,
        direction: Direction,
        edge_type: Option<EdgeType>,
    ) -> Vec<PdgEdgeRef> {
        self.edges_directed(node, direction, edge_type)
    }

    /// Sources of incoming edges (one entry per edge)
    pub fn in_nodes(&self, node: NodeIndex, edge_type: Option<EdgeType>) -> Vec<NodeIndex> {
        self.in_edges(node, edge_type).into_iter().map(|e| e.from).collect()
    }

    /// Targets of outgoing edges (one entry per edge)
    pub fn out_nodes(&self, node: NodeIndex, edge_type: Option<EdgeType>) -> Vec<NodeIndex> {
        self.out_edges(node, edge_type).into_iter().map(|e| e.to).collect()
    }

    /// Neighbours across edges in `direction`
    pub fn neighbours(
        &self,
        node: NodeIndex,
        direction: Direction,
        edge_type: Option<EdgeType>,
    ) -> Vec<NodeIndex> {
        match direction {
            Direction::Incoming => self.in_nodes(node, edge_type),
            Direction::Outgoing => self.out_nodes(node, edge_type),
        }
    }

    /// Outgoing targets accepted by `filter`
    pub fn filter_out_nodes<F>(&self, node: NodeIndex, filter: F) -> Vec<NodeIndex>
    where
        F: Fn(&PdgNode) -> bool,
    {
        self.out_nodes(node, None)
            .into_iter()
            .filter(|&n| filter(&self.graph[n]))
            .collect()
    }

    /// Incoming sources accepted by `filter`
    pub fn filter_in_nodes<F>(&self, node: NodeIndex, filter: F) -> Vec<NodeIndex>
    where
        F: Fn(&PdgNode) -> bool,
    {
        self.in_nodes(node, None)
            .into_iter()
            .filter(|&n| filter(&self.graph[n]))
            .collect()
    }

    pub fn edge(&self, edge: EdgeIndex) -> Option<PdgEdgeRef> {
        let (from, to) = self.graph.edge_endpoints(edge)?;
        let weight = self.graph.edge_weight(edge)?;
        Some(PdgEdgeRef {
            index: edge,
            from,
            to,
            edge_type: weight.edge_type,
        })
    }

    pub fn edge_label(&self, edge: EdgeIndex) -> Option<&str> {
        self.graph.edge_weight(edge)?.label.as_deref()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Memo control
    // ═══════════════════════════════════════════════════════════════════════

    /// Forget everything cached on `node`
    pub fn invalidate(&mut self, node: NodeIndex) {
        self.graph[node].memo = Default::default();
    }

    /// Forget everything cached on every node
    pub fn invalidate_all(&mut self) {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for idx in indices {
            self.graph[idx].memo = Default::default();
        }
        debug!("pdg memo cleared ({} nodes)", self.graph.node_count());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Statistics, export, verification
    // ═══════════════════════════════════════════════════════════════════════

    /// Get statistics
    pub fn get_stats(&self) -> PdgStats {
        let mut stats = PdgStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            ..Default::default()
        };

        for edge in self.graph.edge_weights() {
            match edge.edge_type {
                EdgeType::Control => stats.control_edges += 1,
                EdgeType::Data => stats.data_edges += 1,
                EdgeType::Call => stats.call_edges += 1,
                EdgeType::RemoteCall | EdgeType::RemoteData => stats.remote_edges += 1,
                EdgeType::ObjMember | EdgeType::Prototype => stats.object_edges += 1,
            }
        }

        stats
    }

    /// Debug export: nodes in creation order, edges grouped by source
    pub fn to_dto(&self) -> PdgDto {
        let order = self.node_indices();
        let nodes = order
            .iter()
            .map(|&idx| {
                let node = &self.graph[idx];
                NodeDto {
                    id: node.id.clone(),
                    cnt: node.cnt,
                    kind: node.kind.label(),
                    ftype: node.known_ftype().cloned(),
                    tier: node
                        .functionality_data()
                        .and_then(|data| data.tier)
                        .or(node.memo.tier.flatten()),
                }
            })
            .collect();
        let edges = order
            .iter()
            .flat_map(|&idx| self.out_edges(idx, None))
            .map(|edge| EdgeDto {
                from: self.graph[edge.from].id.clone(),
                to: self.graph[edge.to].id.clone(),
                edge_type: edge.edge_type,
                label: self.edge_label(edge.index).map(str::to_string),
            })
            .collect();
        PdgDto { nodes, edges }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_dto())?)
    }

    /// Re-check construction invariants
    pub fn verify(&self) -> Result<()> {
        if self.node_map.len() != self.graph.node_count() {
            return Err(PdgError::invariant(format!(
                "{} ids for {} nodes",
                self.node_map.len(),
                self.graph.node_count()
            )));
        }

        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            if self.node_map.get(&node.id) != Some(&idx) {
                return Err(PdgError::DuplicateNode(node.id.clone()));
            }

            if let Some(entry) = node.entry_data() {
                for &exit in &entry.exc_exits {
                    match self.graph.node_weight(exit) {
                        Some(exit_node) if exit_node.is_exit_node() => {}
                        Some(other) => {
                            return Err(PdgError::kind_mismatch(
                                other.id.clone(),
                                "exit",
                                other.kind.label(),
                            ))
                        }
                        None => {
                            return Err(PdgError::invariant(format!(
                                "{} registers a missing exception exit",
                                node.id
                            )))
                        }
                    }
                }
            }

            if let NodeKind::ObjectEntry(data) = &node.kind {
                for (name, &member) in &data.members {
                    if self.graph.node_weight(member).is_none() {
                        return Err(PdgError::invariant(format!(
                            "{} member '{}' points to a missing node",
                            node.id, name
                        )));
                    }
                }
            }
        }

        for edge in self.graph.edge_indices() {
            if self.graph.edge_endpoints(edge).is_none() {
                return Err(PdgError::invariant(format!(
                    "edge {:?} has no endpoints",
                    edge
                )));
            }
        }

        Ok(())
    }
}

impl Default for ProgramDependenceGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// PDG Statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PdgStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub control_edges: usize,
    pub data_edges: usize,
    pub call_edges: usize,
    /// REMOTEC + REMOTED
    pub remote_edges: usize,
    /// OBJMEMBER + PROTOTYPE
    pub object_edges: usize,
}
