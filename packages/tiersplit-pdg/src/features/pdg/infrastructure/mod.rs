//! PDG infrastructure
//!
//! `pdg.rs` owns the arena; the other modules add query families to
//! `ProgramDependenceGraph` through separate `impl` blocks.

mod classification;
mod dependence;
mod functionality;
pub mod pdg;
mod shared;
mod traversal;
mod variants;

pub use pdg::{EdgeDto, NodeDto, PdgDto, PdgStats, ProgramDependenceGraph};
pub use shared::SharedPdg;
