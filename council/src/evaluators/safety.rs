//! Harmful-pattern screening of content.

use std::sync::Arc;
use tracing::{debug, warn};

use charter::{ContentDescriptor, GovernanceRules};

use crate::evaluators::{ContentClassifier, Evaluator};
use crate::types::{OppressionCheck, Result, Severity};

/// Screens content through a [`ContentClassifier`] and grades the result.
pub struct ContentSafetyDetector {
    rules: Arc<GovernanceRules>,
    classifier: Arc<dyn ContentClassifier>,
}

impl ContentSafetyDetector {
    pub fn new(rules: Arc<GovernanceRules>, classifier: Arc<dyn ContentClassifier>) -> Self {
        Self { rules, classifier }
    }

    /// Check one piece of content. Tags are classified along with the text.
    pub async fn check(&self, content: &ContentDescriptor) -> Result<OppressionCheck> {
        let safety = &self.rules.safety;

        let mut text = content.text.clone();
        if !content.tags.is_empty() {
            text.push('\n');
            text.push_str(&content.tags.join(" "));
        }

        let signals = self.classifier.classify(&text).await?;
        let detected_categories = signals.detected();
        let severity = Severity::from_category_count(detected_categories.len());

        let context_bonus = if content.community_context.is_empty() {
            0.0
        } else {
            safety.community_context_bonus
        };
        let confidence = (safety.base_confidence + context_bonus).min(1.0);

        let safe = detected_categories.is_empty()
            || (severity == Severity::Low && confidence < safety.safe_confidence_ceiling);
        let automatic_rejection = severity == Severity::Critical
            || (severity == Severity::High && confidence > safety.auto_reject_confidence);

        let recommendations = if detected_categories.is_empty() {
            vec!["No harmful patterns detected; content cleared".to_string()]
        } else {
            detected_categories
                .iter()
                .map(|c| c.recommendation().to_string())
                .collect()
        };

        if automatic_rejection {
            let categories: Vec<&str> = detected_categories.iter().map(|c| c.as_str()).collect();
            warn!(
                creator_id = %content.creator_id,
                severity = severity.as_str(),
                confidence = confidence,
                categories = ?categories,
                classifier = self.classifier.name(),
                "Content automatically rejected"
            );
        } else {
            debug!(
                creator_id = %content.creator_id,
                severity = severity.as_str(),
                safe = safe,
                "Content screened"
            );
        }

        Ok(OppressionCheck {
            safe,
            evaluated: true,
            detected_categories,
            matched_signals: signals.matches,
            severity,
            confidence,
            automatic_rejection,
            recommendations,
        })
    }
}

#[async_trait::async_trait]
impl Evaluator<ContentDescriptor> for ContentSafetyDetector {
    type Verdict = OppressionCheck;

    fn name(&self) -> &str {
        "content_safety_detector"
    }

    async fn evaluate(&self, content: &ContentDescriptor) -> Result<OppressionCheck> {
        self.check(content).await
    }
}
