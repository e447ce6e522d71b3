//! Decision aggregation.
//!
//! Runs every evaluator a request calls for, combines their verdicts into
//! one immutable [`GovernanceDecision`], and routes proposals to the
//! [`ProposalGovernor`].

use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use charter::{compute_hash, CommunityProposal, GovernanceRules, ValidationError};

use crate::clock::Clock;
use crate::evaluators::{
    ConsentValidator, ContentClassifier, ContentSafetyDetector, Evaluator, PolicyScorer,
    SovereigntyAssessor,
};
use crate::proposal::{MemberRegistry, ProposalGovernor};
use crate::types::{
    ConsentValidation, GovernanceDecision, GovernanceRequest, LiberationValidation,
    OppressionCheck, Result, SovereigntyDecision, VoteResult,
};

/// Prefix of every decision ID.
const DECISION_ID_PREFIX: &str = "gd-";

/// Combines evaluator verdicts into governance decisions.
pub struct DecisionAggregator {
    rules: Arc<GovernanceRules>,
    fingerprint: String,
    policy: PolicyScorer,
    sovereignty: SovereigntyAssessor,
    consent: ConsentValidator,
    safety: ContentSafetyDetector,
    governor: ProposalGovernor,
    clock: Arc<dyn Clock>,
    audit_enabled: bool,
}

impl DecisionAggregator {
    /// Create an aggregator over already-validated rules.
    pub fn new(
        rules: Arc<GovernanceRules>,
        classifier: Arc<dyn ContentClassifier>,
        registry: Arc<dyn MemberRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fingerprint: rules.fingerprint(),
            policy: PolicyScorer::new(rules.clone()),
            sovereignty: SovereigntyAssessor::new(rules.clone(), clock.clone()),
            consent: ConsentValidator::new(rules.clone()),
            safety: ContentSafetyDetector::new(rules.clone(), classifier),
            governor: ProposalGovernor::new(rules.clone(), registry, clock.clone()),
            rules,
            clock,
            audit_enabled: false,
        }
    }

    /// Also log every decision on the `audit` target.
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    pub fn rules(&self) -> &GovernanceRules {
        &self.rules
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn policy(&self) -> &PolicyScorer {
        &self.policy
    }

    pub fn sovereignty(&self) -> &SovereigntyAssessor {
        &self.sovereignty
    }

    pub fn consent(&self) -> &ConsentValidator {
        &self.consent
    }

    pub fn safety(&self) -> &ContentSafetyDetector {
        &self.safety
    }

    pub fn governor(&self) -> &ProposalGovernor {
        &self.governor
    }

    /// Decide a request.
    ///
    /// Evaluators whose input is absent are replaced by permissive stand-ins.
    /// The first evaluator error aborts the decision.
    pub async fn decide(&self, request: &GovernanceRequest) -> Result<GovernanceDecision> {
        let decided_at = self.clock.now();

        let (liberation, sovereignty, consent, safety) = futures::try_join!(
            self.policy.evaluate(&request.operation),
            async {
                match &request.creator_action {
                    Some(action) => self.sovereignty.evaluate(action).await,
                    None => Ok(SovereigntyDecision::not_applicable()),
                }
            },
            async {
                match &request.community_data {
                    Some(data) => self.consent.evaluate(data).await,
                    None => Ok(ConsentValidation::not_applicable()),
                }
            },
            async {
                match &request.content {
                    Some(content) => self.safety.evaluate(content).await,
                    None => Ok(OppressionCheck::not_applicable()),
                }
            },
        )?;

        let approved = liberation.valid && sovereignty.approved && consent.approved && safety.safe;
        let reasons = self.reasons(&liberation, &sovereignty, &consent, &safety);

        let appeal = &self.rules.appeal;
        let appealable = !approved
            && liberation.score >= appeal.min_liberation_score
            && liberation.score < self.rules.policy.valid_threshold
            && !safety.automatic_rejection;
        let appeal_deadline = if appealable {
            Some(decided_at + Duration::days(i64::from(appeal.window_days)))
        } else {
            None
        };

        let decision_id = self.decision_id(request, &decided_at.to_rfc3339())?;

        info!(
            decision_id = %decision_id,
            approved = approved,
            liberation_score = liberation.score,
            appealable = appealable,
            "Governance decision made"
        );
        if self.audit_enabled {
            info!(
                target: "audit",
                decision_id = %decision_id,
                decided_at = %decided_at.to_rfc3339(),
                approved = approved,
                liberation_valid = liberation.valid,
                sovereignty_approved = sovereignty.approved,
                consent_approved = consent.approved,
                content_safe = safety.safe,
                rules_version = %self.rules.version,
                rules_fingerprint = %self.fingerprint,
                "Governance decision"
            );
        }

        Ok(GovernanceDecision {
            decision_id,
            decided_at,
            approved,
            liberation,
            sovereignty,
            consent,
            safety,
            reasons,
            appealable,
            appeal_deadline,
            rules_version: self.rules.version.clone(),
            rules_fingerprint: self.fingerprint.clone(),
            requires_storage: true,
        })
    }

    /// Route a vote-type request to the proposal governor.
    pub async fn decide_vote(&self, proposal: &CommunityProposal) -> Result<VoteResult> {
        self.governor.govern(proposal).await
    }

    fn decision_id(&self, request: &GovernanceRequest, decided_at: &str) -> Result<String> {
        let encoded = serde_json::to_string(request)
            .map_err(|e| ValidationError::new("request", e.to_string()))?;
        let hash =
            compute_hash(format!("{}|{}|{}", encoded, self.fingerprint, decided_at).as_bytes());
        Ok(format!("{}{}", DECISION_ID_PREFIX, &hash[..16]))
    }

    fn reasons(
        &self,
        liberation: &LiberationValidation,
        sovereignty: &SovereigntyDecision,
        consent: &ConsentValidation,
        safety: &OppressionCheck,
    ) -> Vec<String> {
        let mut reasons = Vec::with_capacity(4);

        if liberation.valid {
            reasons.push(format!(
                "Liberation principles satisfied (score {:.2})",
                liberation.score
            ));
        } else {
            let detail = if liberation.recommendations.is_empty() {
                liberation.feedback.join("; ")
            } else {
                liberation.recommendations.join("; ")
            };
            reasons.push(format!(
                "Liberation principles not satisfied (score {:.2}): {}",
                liberation.score, detail
            ));
        }

        if sovereignty.approved {
            reasons.push(sovereignty.summary.clone());
        } else {
            reasons.push(format!(
                "{}: {}",
                sovereignty.summary,
                sovereignty.required_actions.join("; ")
            ));
        }

        reasons.push(consent.summary.clone());

        if !safety.evaluated {
            reasons.push("No content in request".to_string());
        } else if safety.safe {
            reasons.push("Content cleared by safety screening".to_string());
        } else {
            let categories: Vec<&str> =
                safety.detected_categories.iter().map(|c| c.as_str()).collect();
            reasons.push(format!(
                "Content flagged ({} severity: {}){}: {}",
                safety.severity.as_str(),
                categories.join(", "),
                if safety.automatic_rejection {
                    ", automatically rejected"
                } else {
                    ""
                },
                safety.recommendations.join("; ")
            ));
        }

        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::evaluators::KeywordClassifier;
    use crate::proposal::StaticMemberRegistry;
    use charter::{
        ContentDescriptor, EconomicImpact, LiberationImpact, OperationDescriptor,
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn aggregator() -> DecisionAggregator {
        DecisionAggregator::new(
            Arc::new(GovernanceRules::default()),
            Arc::new(KeywordClassifier::new()),
            Arc::new(StaticMemberRegistry::default()),
            Arc::new(FixedClock::new(now())),
        )
    }

    fn operation(creator: f64, scores: f64) -> OperationDescriptor {
        let rest = 1.0 - creator;
        OperationDescriptor::new("Publish the spring issue")
            .with_economic_impact(EconomicImpact {
                creator_revenue_share: creator,
                community_share: rest * 0.5,
                platform_share: rest * 0.2,
                mutual_aid_fund: rest * 0.2,
                liberation_investment: rest * 0.1,
            })
            .with_liberation_impact(LiberationImpact::uniform(scores))
    }

    #[tokio::test]
    async fn test_operation_only_request() {
        let decision = aggregator()
            .decide(&GovernanceRequest::new(operation(0.8, 0.85)))
            .await
            .unwrap();

        assert!(decision.approved);
        assert!(!decision.sovereignty.evaluated);
        assert!(!decision.consent.evaluated);
        assert!(!decision.safety.evaluated);
        assert_eq!(decision.reasons.len(), 4);
        assert!(decision.decision_id.starts_with("gd-"));
        assert_eq!(decision.decision_id.len(), 19);
        assert_eq!(decision.decided_at, now());
        assert!(decision.requires_storage);
        assert!(!decision.appealable);
    }

    #[tokio::test]
    async fn test_borderline_rejection_is_appealable() {
        let decision = aggregator()
            .decide(&GovernanceRequest::new(operation(0.8, 0.62)))
            .await
            .unwrap();

        assert!(!decision.approved);
        assert!(decision.liberation.score >= 0.6 && decision.liberation.score < 0.7);
        assert!(decision.appealable);
        assert_eq!(decision.appeal_deadline, Some(now() + Duration::days(30)));
    }

    #[tokio::test]
    async fn test_auto_rejected_content_is_not_appealable() {
        let request = GovernanceRequest::new(operation(0.8, 0.62)).with_content(
            ContentDescriptor::new("c1", "poor people are lazy and women are too emotional")
                .with_community_context("community-1"),
        );

        let decision = aggregator().decide(&request).await.unwrap();
        assert!(decision.safety.automatic_rejection);
        assert!(!decision.appealable);
        assert!(decision.appeal_deadline.is_none());
        assert!(decision.reasons[3].contains("automatically rejected"));
    }

    #[tokio::test]
    async fn test_decision_id_depends_on_rules() {
        let request = GovernanceRequest::new(operation(0.8, 0.85));
        let first = aggregator().decide(&request).await.unwrap();

        let mut rules = GovernanceRules::default();
        rules.version = "1.0.1".to_string();
        let other = DecisionAggregator::new(
            Arc::new(rules),
            Arc::new(KeywordClassifier::new()),
            Arc::new(StaticMemberRegistry::default()),
            Arc::new(FixedClock::new(now())),
        );
        let second = other.decide(&request).await.unwrap();

        assert_ne!(first.decision_id, second.decision_id);
        assert_ne!(first.rules_fingerprint, second.rules_fingerprint);
    }
}
