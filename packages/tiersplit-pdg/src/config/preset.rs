//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Small programs and CI: tight traversal bounds
    Fast,

    /// Default for whole-program splits
    Balanced,

    /// Large generated programs: generous bounds, warns on every
    /// undetermined tier
    Thorough,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            _ => Err(format!(
                "Unknown preset '{}'. Valid presets: fast, balanced, thorough",
                s
            )),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str("fast").unwrap(), Preset::Fast);
        assert_eq!(Preset::from_str("FAST").unwrap(), Preset::Fast);
        assert_eq!(Preset::from_str("balanced").unwrap(), Preset::Balanced);
        assert_eq!(Preset::from_str("thorough").unwrap(), Preset::Thorough);
        assert!(Preset::from_str("custom").is_err());
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::Fast.to_string(), "fast");
        assert_eq!(Preset::Thorough.to_string(), "thorough");
    }

    #[test]
    fn test_default_preset() {
        assert_eq!(Preset::default(), Preset::Balanced);
    }
}
