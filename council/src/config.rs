//! Configuration for the decision engine.

use serde::{Deserialize, Serialize};
use tracing::info;

use charter::{GovernanceRules, RuleSource};

use crate::types::Result;

/// Configuration for a governance engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine ID
    pub engine_id: String,
    /// Governance rules
    #[serde(default)]
    pub rules: GovernanceRules,
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_id: uuid::Uuid::new_v4().to_string(),
            rules: GovernanceRules::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with engine ID.
    pub fn new(engine_id: impl Into<String>) -> Self {
        Self {
            engine_id: engine_id.into(),
            ..Default::default()
        }
    }

    /// Create a config whose rules come from a rule source.
    pub async fn from_source(
        engine_id: impl Into<String>,
        source: &dyn RuleSource,
    ) -> Result<Self> {
        let rules = source.load().await?;
        info!(
            source = source.name(),
            version = %rules.version,
            "Loaded governance rules for engine"
        );
        Ok(Self {
            rules,
            ..Self::new(engine_id)
        })
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log every decision on the `audit` target
    pub audit_enabled: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            audit_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter::StaticRuleSource;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.general.audit_enabled);
        assert_eq!(config.rules, GovernanceRules::default());
        assert!(!config.engine_id.is_empty());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::new("test-engine");
        let yaml = config.to_yaml().unwrap();
        let parsed = EngineConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "engine_id: council-1\n\
                    rules:\n  voting:\n    default_quorum: 0.35\n\
                    general:\n  audit_enabled: false\n";
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.engine_id, "council-1");
        assert_eq!(config.rules.voting.default_quorum, 0.35);
        assert_eq!(config.rules.voting.default_threshold, 0.60);
        assert!(!config.general.audit_enabled);
    }

    #[tokio::test]
    async fn test_from_source() {
        let mut rules = GovernanceRules::default();
        rules.version = "2.0.0".to_string();
        let source = StaticRuleSource::new(rules);

        let config = EngineConfig::from_source("sourced", &source).await.unwrap();
        assert_eq!(config.engine_id, "sourced");
        assert_eq!(config.rules.version, "2.0.0");
    }
}
