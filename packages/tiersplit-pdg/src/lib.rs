/*
 * Tiersplit PDG - Distributed Program Dependency Graph
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Parse-construct contract consumed by the graph
 * - features/    : pdg (domain → infrastructure → ports → application)
 * - config/      : Analysis presets and YAML overrides
 *
 * One graph per compiled source unit. Builders add nodes and edges,
 * analyses classify tiers and compute dependence closures, the rewrite
 * pass reads the results and may edit edges between passes.
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Counting queries take root, kind, tag and direction
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models (source construct contract)
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisConfig, Preset};
pub use errors::{PdgError, Result};
pub use features::pdg::application::{classify_program, summarize_slices, ClassificationReport, SliceSummary};
pub use features::pdg::domain::{
    Arity, EdgeType, FType, FTypeResolution, NodeKind, ParamDirection, PdgEdgeRef, PdgNode, Tier,
};
pub use features::pdg::{PdgQueryPort, PdgStats, ProgramDependenceGraph, SharedPdg};
pub use shared::models::{Construct, ConstructId, SourceConstruct, SyntaxKind};

// Node handles are petgraph indices
pub use petgraph::graph::{EdgeIndex, NodeIndex};
pub use petgraph::Direction;
