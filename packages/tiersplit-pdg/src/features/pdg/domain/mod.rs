//! PDG domain models
//!
//! Node variants, edge kinds, and the tier vocabulary.

pub mod edge;
pub mod node;
pub mod tier;

pub use edge::{EdgeType, PdgEdge, PdgEdgeRef};
pub use node::{
    EntryData, FunctionalityData, NodeKind, NodeMemo, ObjectEntryData, ParamDirection, PdgNode,
};
pub use tier::{arity_equals, ftype_equals, Arity, FType, FTypeResolution, Tier};
