//! Error types for tiersplit-pdg
//!
//! Queries over a finished graph never fail; they answer with `false`,
//! `None` or an empty collection. Errors are reserved for construction
//! mistakes made by the graph builder and for configuration problems.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for PDG construction and configuration
#[derive(Debug, Error)]
pub enum PdgError {
    /// A node with this id already exists in the graph
    #[error("Duplicate node id '{0}'")]
    DuplicateNode(String),

    /// Lookup by id found nothing
    #[error("Unknown node '{0}'")]
    UnknownNode(String),

    /// Variant-specific operation applied to a node of another variant
    #[error("Node '{node}' is a {found} node, expected {expected}")]
    KindMismatch {
        node: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Upward call-as-argument walk did not reach an outermost call
    #[error("Call chain starting at '{start}' exceeded {limit} levels")]
    CallChainLimit { start: String, limit: usize },

    /// Structural invariant broken after construction
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON export error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PdgError {
    /// Create a kind mismatch error
    pub fn kind_mismatch(node: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        PdgError::KindMismatch {
            node: node.into(),
            expected,
            found,
        }
    }

    /// Create an invariant violation
    pub fn invariant(msg: impl Into<String>) -> Self {
        PdgError::Invariant(msg.into())
    }
}

/// Result type alias for PDG operations
pub type Result<T> = std::result::Result<T, PdgError>;
