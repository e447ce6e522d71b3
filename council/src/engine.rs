//! GovernanceEngine - the entry point callers hold.
//!
//! Wires the evaluators, the aggregator and the external collaborators
//! together from one validated [`EngineConfig`].

use std::sync::Arc;
use tracing::{debug, info, warn};

use charter::{
    CommunityDataDescriptor, CommunityProposal, ContentDescriptor, CreatorActionDescriptor,
    GovernanceRules, OperationDescriptor, RuleSource,
};

use crate::aggregator::DecisionAggregator;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::evaluators::{ContentClassifier, Evaluator, KeywordClassifier};
use crate::proposal::{self, MemberRegistry, StaticMemberRegistry};
use crate::store::DecisionStore;
use crate::types::{
    Ballot, ConsentValidation, GovernanceDecision, GovernanceError, GovernanceRequest,
    LiberationValidation, OppressionCheck, Result, SovereigntyDecision, TallyResult, VoteResult,
};

/// The governance decision engine.
///
/// Holds only immutable shared state, so one engine can serve concurrent
/// requests.
pub struct GovernanceEngine {
    engine_id: String,
    aggregator: DecisionAggregator,
    store: Option<Arc<dyn DecisionStore>>,
}

impl GovernanceEngine {
    /// Start building an engine from a config.
    pub fn builder(config: EngineConfig) -> GovernanceEngineBuilder {
        GovernanceEngineBuilder::new(config)
    }

    /// Create an engine with default rules and collaborators.
    pub fn new(engine_id: impl Into<String>) -> Result<Self> {
        Self::with_config(EngineConfig::new(engine_id))
    }

    /// Create with custom configuration and default collaborators.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Create with custom rules and default collaborators.
    pub fn with_rules(engine_id: impl Into<String>, rules: GovernanceRules) -> Result<Self> {
        let mut config = EngineConfig::new(engine_id);
        config.rules = rules;
        Self::with_config(config)
    }

    /// Create with rules loaded from a rule source.
    pub async fn from_source(
        engine_id: impl Into<String>,
        source: &dyn RuleSource,
    ) -> Result<Self> {
        Self::with_config(EngineConfig::from_source(engine_id, source).await?)
    }

    /// Get engine ID.
    pub fn id(&self) -> &str {
        &self.engine_id
    }

    /// Rules this engine decides under.
    pub fn rules(&self) -> &GovernanceRules {
        self.aggregator.rules()
    }

    /// Fingerprint of the rules, recorded on every decision.
    pub fn rules_fingerprint(&self) -> &str {
        self.aggregator.fingerprint()
    }

    /// Score an operation against the liberation principles.
    pub async fn score_policy(
        &self,
        operation: &OperationDescriptor,
    ) -> Result<LiberationValidation> {
        self.aggregator.policy().evaluate(operation).await
    }

    /// Assess a creator action for creator sovereignty.
    pub async fn assess_sovereignty(
        &self,
        action: &CreatorActionDescriptor,
    ) -> Result<SovereigntyDecision> {
        self.aggregator.sovereignty().evaluate(action).await
    }

    /// Validate consent for a community data operation.
    pub async fn validate_consent(
        &self,
        data: &CommunityDataDescriptor,
    ) -> Result<ConsentValidation> {
        self.aggregator.consent().evaluate(data).await
    }

    /// Screen content for harmful patterns.
    pub async fn check_content_safety(
        &self,
        content: &ContentDescriptor,
    ) -> Result<OppressionCheck> {
        self.aggregator.safety().evaluate(content).await
    }

    /// Validate a proposal and compute the rules it will be voted under.
    pub async fn govern_proposal(&self, proposal: &CommunityProposal) -> Result<VoteResult> {
        self.aggregator.decide_vote(proposal).await
    }

    /// Tally ballots for a proposal approved for voting.
    pub fn tally_votes(&self, result: &VoteResult, ballots: &[Ballot]) -> Result<TallyResult> {
        proposal::tally(result, ballots)
    }

    /// Decide a request.
    pub async fn decide(&self, request: &GovernanceRequest) -> Result<GovernanceDecision> {
        self.aggregator.decide(request).await
    }

    /// Decide a request and record the decision in the decision store.
    pub async fn decide_and_record(
        &self,
        request: &GovernanceRequest,
    ) -> Result<GovernanceDecision> {
        let store = self
            .store
            .as_ref()
            .ok_or(GovernanceError::MissingCollaborator("decision store"))?;

        let decision = self.aggregator.decide(request).await?;
        store.record(&decision).await?;

        debug!(
            engine_id = %self.engine_id,
            decision_id = %decision.decision_id,
            store = store.name(),
            "Decision recorded"
        );
        Ok(decision)
    }
}

/// Builder for [`GovernanceEngine`].
pub struct GovernanceEngineBuilder {
    config: EngineConfig,
    classifier: Option<Arc<dyn ContentClassifier>>,
    registry: Option<Arc<dyn MemberRegistry>>,
    store: Option<Arc<dyn DecisionStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl GovernanceEngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            classifier: None,
            registry: None,
            store: None,
            clock: None,
        }
    }

    /// Set the content classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn ContentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the member registry.
    pub fn with_member_registry(mut self, registry: Arc<dyn MemberRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the decision store.
    pub fn with_decision_store(mut self, store: Arc<dyn DecisionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the rules and build the engine.
    pub fn build(self) -> Result<GovernanceEngine> {
        let EngineConfig {
            engine_id,
            rules,
            general,
        } = self.config;

        rules.validate()?;

        let registry = self.registry.unwrap_or_else(|| {
            warn!(
                engine_id = %engine_id,
                "No member registry configured - proposals will resolve an empty voter roll"
            );
            Arc::new(StaticMemberRegistry::default())
        });
        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(KeywordClassifier::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let aggregator = DecisionAggregator::new(Arc::new(rules), classifier, registry, clock)
            .with_audit(general.audit_enabled);

        info!(
            engine_id = %engine_id,
            rules_version = %aggregator.rules().version,
            rules_fingerprint = %aggregator.fingerprint(),
            audit = general.audit_enabled,
            "Governance engine ready"
        );

        Ok(GovernanceEngine {
            engine_id,
            aggregator,
            store: self.store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDecisionStore;
    use charter::{EconomicImpact, LiberationImpact, RulesError};
    use tokio_test::{assert_err, assert_ok};

    fn request() -> GovernanceRequest {
        GovernanceRequest::new(
            OperationDescriptor::new("Open a cooperative print shop")
                .with_economic_impact(EconomicImpact {
                    creator_revenue_share: 0.8,
                    community_share: 0.1,
                    platform_share: 0.04,
                    mutual_aid_fund: 0.04,
                    liberation_investment: 0.02,
                })
                .with_liberation_impact(LiberationImpact::uniform(0.85)),
        )
    }

    #[test]
    fn test_new_engine() {
        let engine = GovernanceEngine::new("test-engine").unwrap();
        assert_eq!(engine.id(), "test-engine");
        assert_eq!(engine.rules().version, "1.0.0");
        assert_eq!(engine.rules_fingerprint().len(), 64);
    }

    #[test]
    fn test_invalid_rules_rejected_at_build() {
        let mut rules = GovernanceRules::default();
        rules.policy.weights.mutual_aid = 0.2;

        let result = GovernanceEngine::with_rules("bad", rules);
        assert!(matches!(
            result.err(),
            Some(GovernanceError::Configuration(RulesError::WeightsNotNormalized { .. }))
        ));
    }

    #[tokio::test]
    async fn test_decide_and_record_requires_store() {
        let engine = GovernanceEngine::new("no-store").unwrap();
        let err = assert_err!(engine.decide_and_record(&request()).await);
        assert!(matches!(
            err,
            GovernanceError::MissingCollaborator("decision store")
        ));
    }

    #[tokio::test]
    async fn test_decide_and_record_forwards_to_store() {
        let store = Arc::new(InMemoryDecisionStore::new());
        let engine = GovernanceEngine::builder(EngineConfig::new("recording"))
            .with_decision_store(store.clone())
            .build()
            .unwrap();

        let decision = assert_ok!(engine.decide_and_record(&request()).await);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&decision.decision_id).await, Some(decision));
    }

    #[tokio::test]
    async fn test_from_source() {
        let source = charter::StaticRuleSource::default();
        let engine = assert_ok!(GovernanceEngine::from_source("sourced", &source).await);
        assert_eq!(engine.rules(), &GovernanceRules::default());
    }
}
