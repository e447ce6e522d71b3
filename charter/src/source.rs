//! Rule configuration sources.
//!
//! The engine is parameterized from a [`RuleSource`] so rule changes only
//! need a new source snapshot, not a redeploy. Sources only load; they never
//! validate. Validation happens when an engine is built.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::rules::{GovernanceRules, RulesError};

/// Error types for rule source operations.
#[derive(Debug, thiserror::Error)]
pub enum RuleSourceError {
    /// Source is not reachable
    #[error("Rule source unavailable: {0}")]
    Unavailable(String),

    /// Source returned rules that could not be parsed
    #[error("Invalid rules: {0}")]
    Invalid(#[from] RulesError),

    /// I/O failure reading the source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies the current governance rules.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Identifier for logs.
    fn name(&self) -> &str;

    /// Load the current rule set.
    async fn load(&self) -> Result<GovernanceRules, RuleSourceError>;
}

/// In-memory rule source.
///
/// Holds a snapshot that can be replaced at runtime; engines built afterwards
/// pick up the new rules.
pub struct StaticRuleSource {
    rules: Arc<RwLock<GovernanceRules>>,
}

impl StaticRuleSource {
    pub fn new(rules: GovernanceRules) -> Self {
        Self {
            rules: Arc::new(RwLock::new(rules)),
        }
    }

    /// Replace the held rule set.
    pub async fn replace(&self, rules: GovernanceRules) {
        let mut current = self.rules.write().await;
        tracing::info!(
            from_version = %current.version,
            to_version = %rules.version,
            "Replacing governance rules"
        );
        *current = rules;
    }
}

impl Default for StaticRuleSource {
    fn default() -> Self {
        Self::new(GovernanceRules::default())
    }
}

#[async_trait]
impl RuleSource for StaticRuleSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn load(&self) -> Result<GovernanceRules, RuleSourceError> {
        Ok(self.rules.read().await.clone())
    }
}

/// Reads rules from a YAML file on every load.
pub struct YamlFileRuleSource {
    path: PathBuf,
    name: String,
}

impl YamlFileRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("yaml:{}", path.display());
        Self { path, name }
    }
}

#[async_trait]
impl RuleSource for YamlFileRuleSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<GovernanceRules, RuleSourceError> {
        let yaml = match tokio::fs::read_to_string(&self.path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RuleSourceError::Unavailable(format!(
                    "{} does not exist",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let rules = GovernanceRules::from_yaml(&yaml)?;
        tracing::debug!(
            source = %self.name,
            version = %rules.version,
            "Loaded governance rules"
        );
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "charter-{}-{}.yaml",
            label,
            uuid::Uuid::new_v4()
        ))
    }

    #[tokio::test]
    async fn test_static_source_replace() {
        let source = StaticRuleSource::default();
        assert_eq!(source.load().await.unwrap().version, "1.0.0");

        let mut next = GovernanceRules::default();
        next.version = "1.1.0".to_string();
        source.replace(next).await;

        assert_eq!(source.load().await.unwrap().version, "1.1.0");
    }

    #[tokio::test]
    async fn test_yaml_file_source() {
        let path = temp_path("load");
        tokio::fs::write(&path, "version: \"3.0.0\"\nappeal:\n  window_days: 14\n")
            .await
            .unwrap();

        let source = YamlFileRuleSource::new(&path);
        let rules = assert_ok!(source.load().await);
        assert_eq!(rules.version, "3.0.0");
        assert_eq!(rules.appeal.window_days, 14);
        assert_eq!(rules.appeal.min_liberation_score, 0.6);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let source = YamlFileRuleSource::new(temp_path("missing"));
        let err = assert_err!(source.load().await);
        assert!(matches!(err, RuleSourceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_unparsable_file_is_invalid() {
        let path = temp_path("garbage");
        tokio::fs::write(&path, "voting: [not, a, mapping]\n").await.unwrap();

        let err = assert_err!(YamlFileRuleSource::new(&path).load().await);
        assert!(matches!(err, RuleSourceError::Invalid(RulesError::Parse(_))));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
