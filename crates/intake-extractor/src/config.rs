//! Configuration for standardization and inference

use crate::inference::MobilityPolicy;
use serde::{Deserialize, Serialize};

/// Default value written to cells a human has to fill in
pub const DEFAULT_MANUAL_SENTINEL: &str = "Filled manually";

/// Configuration for the Standardizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Cell value for unresolved and ambiguous fields
    pub manual_sentinel: String,

    /// How the mobility column is filled
    pub mobility: MobilityPolicy,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let sentinel = self.manual_sentinel.trim();
        if sentinel.is_empty() {
            return Err("manual_sentinel must not be empty".to_string());
        }
        if matches!(sentinel, "Yes" | "No" | "Unknown") {
            return Err(format!(
                "manual_sentinel '{}' collides with a determination value",
                sentinel
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            manual_sentinel: DEFAULT_MANUAL_SENTINEL.to_string(),
            mobility: MobilityPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_sentinel_is_invalid() {
        let config = ExtractorConfig {
            manual_sentinel: "  ".to_string(),
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sentinel_must_not_look_like_an_answer() {
        let config = ExtractorConfig {
            manual_sentinel: "No".to_string(),
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            manual_sentinel: "Please fill this manually".to_string(),
            mobility: MobilityPolicy::GermanConnectionOverride,
        };
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("german_connection_override"));
        assert_eq!(ExtractorConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("mobility = \"german_connection_override\"").unwrap();
        assert_eq!(config.manual_sentinel, DEFAULT_MANUAL_SENTINEL);
    }
}
