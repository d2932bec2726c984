//! Common test utilities for tiersplit-pdg
//!
//! Shared fixtures, assertions, and builders for the integration tests.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;
mod logging;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use logging::*;
