//! Analysis configuration
//!
//! Two levels, following the preset-then-override pattern:
//! - Preset: `AnalysisConfig::from_preset(Preset::Fast)`
//! - YAML: `AnalysisConfig::from_yaml("analysis.yaml")`, a versioned
//!   document naming a preset plus field overrides
//!
//! ```rust,ignore
//! use tiersplit_pdg::config::{AnalysisConfig, Preset};
//!
//! let config = AnalysisConfig::from_preset(Preset::Balanced).call_chain_limit(32);
//! config.validate()?;
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;
pub mod preset;

// Re-exports
pub use analysis_config::AnalysisConfig;
pub use error::{ConfigError, ConfigResult};
pub use io::{AnalysisOverrides, ConfigFileV1};
pub use preset::Preset;
