//! PDG node model
//!
//! Every node shares the same core (id, creation counter, source construct,
//! memo) and carries a closed `NodeKind` with the variant-specific state.
//! Adjacency lives in the graph arena, not in the node.

use crate::features::pdg::domain::tier::{Arity, FType, Tier};
use crate::shared::models::SourceConstruct;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Parameter direction: `In = +1` (argument flow), `Out = -1` (return flow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamDirection {
    In,
    Out,
}

impl ParamDirection {
    pub fn value(&self) -> i8 {
        match self {
            ParamDirection::In => 1,
            ParamDirection::Out => -1,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            ParamDirection::In => "in",
            ParamDirection::Out => "out",
        }
    }
}

/// State of a function entry (also embedded in object entries)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryData {
    pub is_called: bool,
    pub client_calls_nr: u32,
    pub server_calls_nr: u32,
    pub is_constructor: bool,
    /// Exception exits, in registration order
    pub exc_exits: Vec<NodeIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectEntryData {
    pub entry: EntryData,
    pub members: HashMap<String, NodeIndex>,
    pub constructor_node: Option<NodeIndex>,
}

/// Slice root: a block whose tier is declared by annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionalityData {
    pub ftype: FType,
    pub tier: Option<Tier>,
    /// Created from a tier annotation; tag and tier coincide
    pub distributed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Entry(EntryData),
    ObjectEntry(ObjectEntryData),
    Call { arity: Option<Arity> },
    Statement,
    FormalParameter { direction: ParamDirection, name: String },
    ActualParameter { direction: ParamDirection, value: Option<String> },
    Exit { exception: bool },
    Functionality(FunctionalityData),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Entry(_) => "entry",
            NodeKind::ObjectEntry(_) => "object entry",
            NodeKind::Call { .. } => "call",
            NodeKind::Statement => "statement",
            NodeKind::FormalParameter { .. } => "formal parameter",
            NodeKind::ActualParameter { .. } => "actual parameter",
            NodeKind::Exit { .. } => "exit",
            NodeKind::Functionality(data) if data.distributed => "distributed",
            NodeKind::Functionality(_) => "functionality",
        }
    }
}

/// Values cached on a node by memoizing queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMemo {
    pub ftype: Option<FType>,
    /// `Some(None)`: looked up, no slice root declares a tier
    pub tier: Option<Option<Tier>>,
    pub object_entry: Option<NodeIndex>,
}

impl NodeMemo {
    pub fn is_empty(&self) -> bool {
        self.ftype.is_none() && self.tier.is_none() && self.object_entry.is_none()
    }
}

#[derive(Clone)]
pub struct PdgNode {
    pub id: String,
    /// Creation order within one graph
    pub cnt: u64,
    pub kind: NodeKind,
    pub construct: Option<Arc<dyn SourceConstruct>>,
    /// Program root; stops the backward provenance search
    pub is_root: bool,
    /// Marked by the builder as the root of an object literal or constructor
    pub is_object_entry_root: bool,
    pub(crate) memo: NodeMemo,
}

impl PdgNode {
    pub(crate) fn new(
        id: String,
        cnt: u64,
        kind: NodeKind,
        construct: Option<Arc<dyn SourceConstruct>>,
    ) -> Self {
        PdgNode {
            id,
            cnt,
            kind,
            construct,
            is_root: false,
            is_object_entry_root: false,
            memo: NodeMemo::default(),
        }
    }

    pub fn memo(&self) -> &NodeMemo {
        &self.memo
    }

    pub fn construct(&self) -> Option<&dyn SourceConstruct> {
        self.construct.as_deref()
    }

    /// Object entries are not entry nodes
    pub fn is_entry_node(&self) -> bool {
        matches!(self.kind, NodeKind::Entry(_))
    }

    pub fn is_object_entry(&self) -> bool {
        matches!(self.kind, NodeKind::ObjectEntry(_))
    }

    pub fn is_call_node(&self) -> bool {
        matches!(self.kind, NodeKind::Call { .. })
    }

    pub fn is_statement_node(&self) -> bool {
        matches!(self.kind, NodeKind::Statement)
    }

    pub fn is_formal_node(&self) -> bool {
        matches!(self.kind, NodeKind::FormalParameter { .. })
    }

    pub fn is_actual_p_node(&self) -> bool {
        matches!(self.kind, NodeKind::ActualParameter { .. })
    }

    pub fn is_exit_node(&self) -> bool {
        matches!(self.kind, NodeKind::Exit { .. })
    }

    pub fn is_slice_node(&self) -> bool {
        matches!(self.kind, NodeKind::Functionality(_))
    }

    pub fn is_distributed_node(&self) -> bool {
        matches!(&self.kind, NodeKind::Functionality(data) if data.distributed)
    }

    pub fn direction(&self) -> Option<ParamDirection> {
        match &self.kind {
            NodeKind::FormalParameter { direction, .. }
            | NodeKind::ActualParameter { direction, .. } => Some(*direction),
            _ => None,
        }
    }

    /// Entry state of an entry or object entry
    pub fn entry_data(&self) -> Option<&EntryData> {
        match &self.kind {
            NodeKind::Entry(data) => Some(data),
            NodeKind::ObjectEntry(data) => Some(&data.entry),
            _ => None,
        }
    }

    pub(crate) fn entry_data_mut(&mut self) -> Option<&mut EntryData> {
        match &mut self.kind {
            NodeKind::Entry(data) => Some(data),
            NodeKind::ObjectEntry(data) => Some(&mut data.entry),
            _ => None,
        }
    }

    pub fn functionality_data(&self) -> Option<&FunctionalityData> {
        match &self.kind {
            NodeKind::Functionality(data) => Some(data),
            _ => None,
        }
    }

    /// Tag known without searching: a slice root's own tag, else the memo
    pub fn known_ftype(&self) -> Option<&FType> {
        match &self.kind {
            NodeKind::Functionality(data) => Some(&data.ftype),
            _ => self.memo.ftype.as_ref(),
        }
    }

    pub fn is_exception_exit(&self) -> bool {
        matches!(self.kind, NodeKind::Exit { exception: true })
    }

    pub fn equals(&self, other: &PdgNode) -> bool {
        self.id == other.id
    }
}

/// Identity is the id alone
impl PartialEq for PdgNode {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for PdgNode {}

impl fmt::Display for PdgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl fmt::Debug for PdgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdgNode")
            .field("id", &self.id)
            .field("cnt", &self.cnt)
            .field("kind", &self.kind)
            .field("construct", &self.construct.as_ref().map(|c| c.construct_id()))
            .finish()
    }
}
