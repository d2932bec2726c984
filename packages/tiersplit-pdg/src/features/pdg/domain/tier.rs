//! Distribution tiers and functionality tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution target of a program point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Client,
    Server,
    Shared,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Client => "client",
            Tier::Server => "server",
            Tier::Shared => "shared",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "client" => Some(Tier::Client),
            "server" => Some(Tier::Server),
            "shared" => Some(Tier::Shared),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Functionality tag of an annotated block.
///
/// Distribution annotations (`@client`, `@server`) use the tier itself as
/// tag; other slice annotations carry a free-form name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FType {
    Tier(Tier),
    Named(String),
}

impl FType {
    pub fn client() -> Self {
        FType::Tier(Tier::Client)
    }

    pub fn server() -> Self {
        FType::Tier(Tier::Server)
    }

    pub fn shared() -> Self {
        FType::Tier(Tier::Shared)
    }

    /// Tag text as it appears in node ids (`C<tag>`)
    pub fn as_str(&self) -> &str {
        match self {
            FType::Tier(tier) => tier.as_str(),
            FType::Named(name) => name,
        }
    }

    /// Parse a tag; tier names map to `FType::Tier`
    pub fn from_tag(tag: &str) -> Self {
        match Tier::from_str(tag) {
            Some(tier) => FType::Tier(tier),
            None => FType::Named(tag.to_string()),
        }
    }
}

impl fmt::Display for FType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags are compared by value
pub fn ftype_equals(a: &FType, b: &FType) -> bool {
    a == b
}

/// Outcome of the backward provenance search.
///
/// `Undetermined` and a declared `shared` tag both read as shared from the
/// outside; the distinction is kept so callers can spot a missing
/// slice-root edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FTypeResolution {
    /// The nearest slice root supplied the tag
    Declared(FType),
    /// Ancestors exist but none carries a tag
    Undetermined,
    /// No provenance edge reaches the node at all
    Unset,
}

impl FTypeResolution {
    /// Externally observable tag: undetermined reads as shared
    pub fn ftype(&self) -> Option<FType> {
        match self {
            FTypeResolution::Declared(ftype) => Some(ftype.clone()),
            FTypeResolution::Undetermined => Some(FType::shared()),
            FTypeResolution::Unset => None,
        }
    }

    pub fn is_declared(&self) -> bool {
        matches!(self, FTypeResolution::Declared(_))
    }
}

/// Call arity for calls that cross from server to client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// Reply to the calling client only
    One,
    /// Broadcast to every client
    All,
}

impl Arity {
    pub fn value(&self) -> u8 {
        match self {
            Arity::One => 0,
            Arity::All => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Arity::One => "one",
            Arity::All => "all",
        }
    }
}

pub fn arity_equals(a: Arity, b: Arity) -> bool {
    a.value() == b.value()
}
