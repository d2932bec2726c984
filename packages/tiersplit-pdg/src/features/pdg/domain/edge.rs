//! PDG edge model

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relation kinds understood by the analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Control dependence / syntactic nesting
    #[serde(rename = "CONTROL")]
    Control,
    /// Data dependence (def-use)
    #[serde(rename = "DATA")]
    Data,
    /// Local call from a call site to an entry
    #[serde(rename = "CALL")]
    Call,
    /// Call that crosses the client/server boundary
    #[serde(rename = "REMOTEC")]
    RemoteCall,
    /// Data dependence that crosses the client/server boundary
    #[serde(rename = "REMOTED")]
    RemoteData,
    /// Object entry to one of its members
    #[serde(rename = "OBJMEMBER")]
    ObjMember,
    /// Object entry to its prototype object entry
    #[serde(rename = "PROTOTYPE")]
    Prototype,
}

impl EdgeType {
    pub const ALL: [EdgeType; 7] = [
        EdgeType::Control,
        EdgeType::Data,
        EdgeType::Call,
        EdgeType::RemoteCall,
        EdgeType::RemoteData,
        EdgeType::ObjMember,
        EdgeType::Prototype,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Control => "CONTROL",
            EdgeType::Data => "DATA",
            EdgeType::Call => "CALL",
            EdgeType::RemoteCall => "REMOTEC",
            EdgeType::RemoteData => "REMOTED",
            EdgeType::ObjMember => "OBJMEMBER",
            EdgeType::Prototype => "PROTOTYPE",
        }
    }

    /// REMOTEC / REMOTED: the edge already crosses a tier boundary
    pub fn is_remote(&self) -> bool {
        matches!(self, EdgeType::RemoteCall | EdgeType::RemoteData)
    }

    /// CALL / REMOTEC: call site to callee
    pub fn is_call(&self) -> bool {
        matches!(self, EdgeType::Call | EdgeType::RemoteCall)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge weight stored in the graph. Endpoints are implicit in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdgEdge {
    pub edge_type: EdgeType,
    pub label: Option<String>,
    /// Creation sequence; adjacency lists are reported in this order
    pub(crate) seq: u64,
}

impl PdgEdge {
    pub(crate) fn new(edge_type: EdgeType, label: Option<String>, seq: u64) -> Self {
        PdgEdge {
            edge_type,
            label,
            seq,
        }
    }

    pub fn equals_type(&self, edge_type: EdgeType) -> bool {
        self.edge_type == edge_type
    }
}

/// Copyable view of one edge with its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PdgEdgeRef {
    pub index: EdgeIndex,
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub edge_type: EdgeType,
}

impl PdgEdgeRef {
    pub fn equals_type(&self, edge_type: EdgeType) -> bool {
        self.edge_type == edge_type
    }

    /// Self loop
    pub fn is_cycle(&self) -> bool {
        self.from == self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_type_names() {
        assert_eq!(EdgeType::RemoteCall.as_str(), "REMOTEC");
        assert_eq!(EdgeType::RemoteData.to_string(), "REMOTED");
        assert_eq!(
            serde_json::to_string(&EdgeType::ObjMember).unwrap(),
            "\"OBJMEMBER\""
        );
    }

    #[test]
    fn test_edge_type_groups() {
        assert!(EdgeType::RemoteData.is_remote());
        assert!(!EdgeType::Data.is_remote());
        assert!(EdgeType::Call.is_call());
        assert!(EdgeType::RemoteCall.is_call());
        assert!(!EdgeType::Control.is_call());
    }
}
