//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema types. Loading and export live on
//! `AnalysisConfig`.

use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<AnalysisOverrides>,
}

/// Per-field overrides applied on top of the preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_chain_limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub worklist_limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_on_undetermined: Option<bool>,
}
