//! Distributed Program Dependence Graph
//!
//! - domain/         : node variants, edge kinds, tiers
//! - ports/          : query surface for the rewrite pass
//! - infrastructure/ : petgraph arena and the analyses over it
//! - application/    : whole-program classification and slice summaries

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use infrastructure::{PdgDto, PdgStats, ProgramDependenceGraph, SharedPdg};
pub use ports::PdgQueryPort;
