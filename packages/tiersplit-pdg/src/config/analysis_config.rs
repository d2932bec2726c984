//! Analysis configuration
//!
//! Bounds for the worklist traversals and the ambiguity reporting policy.
//! Every graph owns one `AnalysisConfig`; queries read it, never write it.

use super::error::{ConfigError, ConfigResult};
use super::io::{AnalysisOverrides, ConfigFileV1};
use super::preset::Preset;
use serde::{Deserialize, Serialize};

const SUPPORTED_VERSIONS: [u32; 1] = [1];

/// Limits and policies shared by every PDG query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Preset the remaining fields were derived from
    pub preset: Preset,

    /// Maximum levels walked upward through nested call arguments (1..=1000000)
    pub call_chain_limit: usize,

    /// Maximum worklist pops per traversal (1..=100000000)
    pub worklist_limit: usize,

    /// Log a warning instead of a debug line when a tier defaults to shared
    pub warn_on_undetermined: bool,
}

impl AnalysisConfig {
    /// Create from preset
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                preset,
                call_chain_limit: 64,
                worklist_limit: 100_000,
                warn_on_undetermined: false,
            },
            Preset::Balanced => Self {
                preset,
                call_chain_limit: 256,
                worklist_limit: 1_000_000,
                warn_on_undetermined: false,
            },
            Preset::Thorough => Self {
                preset,
                call_chain_limit: 4096,
                worklist_limit: 50_000_000,
                warn_on_undetermined: true,
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.call_chain_limit == 0 || self.call_chain_limit > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "call_chain_limit",
                self.call_chain_limit,
                1,
                1_000_000,
                "Nested call arguments need at least one level",
            ));
        }
        if self.worklist_limit == 0 || self.worklist_limit > 100_000_000 {
            return Err(ConfigError::range_with_hint(
                "worklist_limit",
                self.worklist_limit,
                1,
                100_000_000,
                "Traversal bound must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Builder: Set call_chain_limit
    pub fn call_chain_limit(mut self, v: usize) -> Self {
        self.call_chain_limit = v;
        self
    }

    /// Builder: Set worklist_limit
    pub fn worklist_limit(mut self, v: usize) -> Self {
        self.worklist_limit = v;
        self
    }

    /// Builder: Set warn_on_undetermined
    pub fn warn_on_undetermined(mut self, v: bool) -> Self {
        self.warn_on_undetermined = v;
        self
    }

    /// Load from YAML file (v1 schema)
    pub fn from_yaml(path: &str) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a YAML document (v1 schema)
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = Preset::from_str(&file.preset)
            .map_err(|_| ConfigError::UnknownPreset(file.preset.clone()))?;

        let mut config = Self::from_preset(preset);
        if let Some(overrides) = file.overrides {
            if let Some(v) = overrides.call_chain_limit {
                config.call_chain_limit = v;
            }
            if let Some(v) = overrides.worklist_limit {
                config.worklist_limit = v;
            }
            if let Some(v) = overrides.warn_on_undetermined {
                config.warn_on_undetermined = v;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Export as YAML (v1 schema); only fields that differ from the preset
    /// are written as overrides
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let base = Self::from_preset(self.preset);
        let overrides = AnalysisOverrides {
            call_chain_limit: (self.call_chain_limit != base.call_chain_limit)
                .then_some(self.call_chain_limit),
            worklist_limit: (self.worklist_limit != base.worklist_limit)
                .then_some(self.worklist_limit),
            warn_on_undetermined: (self.warn_on_undetermined != base.warn_on_undetermined)
                .then_some(self.warn_on_undetermined),
        };
        let has_overrides = overrides.call_chain_limit.is_some()
            || overrides.worklist_limit.is_some()
            || overrides.warn_on_undetermined.is_some();

        let file = ConfigFileV1 {
            version: Some(1),
            preset: self.preset.as_str().to_string(),
            overrides: has_overrides.then_some(overrides),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for preset in [Preset::Fast, Preset::Balanced, Preset::Thorough] {
            assert!(AnalysisConfig::from_preset(preset).validate().is_ok());
        }
    }

    #[test]
    fn test_zero_call_chain_limit_rejected() {
        let config = AnalysisConfig::default().call_chain_limit(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Range { ref field, .. }) if field == "call_chain_limit"
        ));
    }

    #[test]
    fn test_yaml_export_without_overrides() {
        let yaml = AnalysisConfig::from_preset(Preset::Thorough).to_yaml().unwrap();
        assert!(yaml.contains("preset: thorough"));
        assert!(!yaml.contains("overrides"));

        let back = AnalysisConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, AnalysisConfig::from_preset(Preset::Thorough));
    }
}
