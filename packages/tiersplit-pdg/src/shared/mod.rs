//! Shared module - Common types and utilities
//!
//! Types shared by every feature. Holds the contract between the PDG and
//! the parser that produced the source constructs.

pub mod models;

// Re-exports for convenience
pub use models::*;
