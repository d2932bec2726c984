//! Shared models

mod construct;

pub use construct::{Construct, ConstructId, SourceConstruct, SyntaxKind};
