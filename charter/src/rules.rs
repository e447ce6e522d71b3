//! Governance rules - the single source of truth for every weight, minimum
//! and threshold the evaluators apply.
//!
//! Rules are plain data: they serialize to YAML for the rule configuration
//! source and are validated once when an engine is built. An engine never
//! serves requests under rules that failed [`GovernanceRules::validate`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::principles::LiberationPrinciple;
use crate::types::ProposalType;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Tolerance for weight vectors summing to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Missing or inconsistent rule configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RulesError {
    /// A weight vector does not sum to 1.0
    #[error("{group} weights must sum to 1.0, got {sum:.6}")]
    WeightsNotNormalized { group: String, sum: f64 },

    /// A fraction-valued setting is outside [0, 1] or not finite
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange { field: String, value: f64 },

    /// Two settings contradict each other
    #[error("Inconsistent rules: {0}")]
    Inconsistent(String),

    /// Rules could not be parsed
    #[error("Failed to parse rules: {0}")]
    Parse(String),
}

/// Complete rule set for the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct GovernanceRules {
    /// Rule set version, recorded on every decision
    pub version: String,
    pub policy: PolicyRules,
    pub sovereignty: SovereigntyRules,
    pub data_consent: DataConsentRules,
    pub safety: SafetyRules,
    pub voting: VotingPolicy,
    pub appeal: AppealRules,
}

impl Default for GovernanceRules {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            policy: PolicyRules::default(),
            sovereignty: SovereigntyRules::default(),
            data_consent: DataConsentRules::default(),
            safety: SafetyRules::default(),
            voting: VotingPolicy::default(),
            appeal: AppealRules::default(),
        }
    }
}

/// Weight of each liberation principle in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PrincipleWeights {
    pub creator_empowerment: f64,
    pub community_liberation: f64,
    pub oppression_resistance: f64,
    pub power_building: f64,
    pub mutual_aid: f64,
}

impl PrincipleWeights {
    pub fn weight(&self, principle: LiberationPrinciple) -> f64 {
        match principle {
            LiberationPrinciple::CreatorEmpowerment => self.creator_empowerment,
            LiberationPrinciple::CommunityLiberation => self.community_liberation,
            LiberationPrinciple::OppressionResistance => self.oppression_resistance,
            LiberationPrinciple::PowerBuilding => self.power_building,
            LiberationPrinciple::MutualAid => self.mutual_aid,
        }
    }

    pub fn sum(&self) -> f64 {
        LiberationPrinciple::all()
            .iter()
            .map(|p| self.weight(*p))
            .sum()
    }
}

impl Default for PrincipleWeights {
    fn default() -> Self {
        Self {
            creator_empowerment: 0.25,
            community_liberation: 0.25,
            oppression_resistance: 0.20,
            power_building: 0.20,
            mutual_aid: 0.10,
        }
    }
}

/// Liberation-principle scoring rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct PolicyRules {
    pub weights: PrincipleWeights,
    /// Overall score an operation needs to be valid
    pub valid_threshold: f64,
    /// Score a single principle needs to pass
    pub principle_pass_threshold: f64,
    /// Bonus per matched indicator phrase
    pub indicator_bonus: f64,
    pub max_indicator_bonus: f64,
    /// Penalty per matched counter-indicator phrase
    pub counter_indicator_penalty: f64,
    pub max_counter_penalty: f64,
    /// Share of the empowerment score taken from the creator revenue share
    pub revenue_blend: f64,
    /// Share of the mutual-aid score taken from the mutual-aid fund fraction
    pub mutual_aid_blend: f64,
    /// Mutual-aid fund fraction that counts as full contribution
    pub mutual_aid_target: f64,
    /// Divergence between caller and computed overall score worth reporting
    pub impact_drift_tolerance: f64,
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            weights: PrincipleWeights::default(),
            valid_threshold: 0.7,
            principle_pass_threshold: 0.6,
            indicator_bonus: 0.05,
            max_indicator_bonus: 0.15,
            counter_indicator_penalty: 0.10,
            max_counter_penalty: 0.30,
            revenue_blend: 0.5,
            mutual_aid_blend: 0.3,
            mutual_aid_target: 0.05,
            impact_drift_tolerance: 0.15,
        }
    }
}

/// Component weights of the narrative-control score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct NarrativeWeights {
    pub ownership: f64,
    pub distribution_control: f64,
    pub editing_rights: f64,
    pub cultural_authenticity: f64,
}

impl NarrativeWeights {
    pub fn sum(&self) -> f64 {
        self.ownership
            + self.distribution_control
            + self.editing_rights
            + self.cultural_authenticity
    }
}

impl Default for NarrativeWeights {
    fn default() -> Self {
        Self {
            ownership: 0.35,
            distribution_control: 0.25,
            editing_rights: 0.15,
            cultural_authenticity: 0.25,
        }
    }
}

/// Creator-sovereignty minimums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct SovereigntyRules {
    /// Inclusive minimum creator revenue share
    pub min_creator_revenue_share: f64,
    /// Inclusive minimum narrative-control score
    pub min_narrative_control: f64,
    pub min_consent_score: f64,
    /// Days before continuing consent must be renewed
    pub consent_validity_days: u32,
    pub narrative_weights: NarrativeWeights,
    /// Content-impact level at which extra consent scopes become required
    pub scope_unlock_threshold: f64,
}

impl Default for SovereigntyRules {
    fn default() -> Self {
        Self {
            min_creator_revenue_share: 0.75,
            min_narrative_control: 0.80,
            min_consent_score: 0.9,
            consent_validity_days: 365,
            narrative_weights: NarrativeWeights::default(),
            scope_unlock_threshold: 0.5,
        }
    }
}

/// Community data consent rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct DataConsentRules {
    pub min_consent_level: f64,
}

impl Default for DataConsentRules {
    fn default() -> Self {
        Self {
            min_consent_level: 0.8,
        }
    }
}

/// Content-safety confidence rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct SafetyRules {
    pub base_confidence: f64,
    /// Added when the content arrives with community context
    pub community_context_bonus: f64,
    /// Low-severity content below this confidence is still safe
    pub safe_confidence_ceiling: f64,
    /// High-severity content above this confidence is rejected outright
    pub auto_reject_confidence: f64,
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            base_confidence: 0.8,
            community_context_bonus: 0.1,
            safe_confidence_ceiling: 0.7,
            auto_reject_confidence: 0.8,
        }
    }
}

/// Democratic voting policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct VotingPolicy {
    pub default_quorum: f64,
    pub default_threshold: f64,
    pub voting_period_days: u32,
    pub liberation_weighted: bool,
    /// Quorum floor for governance-rule proposals
    pub governance_rule_quorum: f64,
    /// Threshold floor for governance-rule proposals
    pub governance_rule_threshold: f64,
    /// Fixed threshold for creator disputes
    pub creator_dispute_threshold: f64,
    /// Overall liberation score above which the threshold is discounted
    pub high_liberation_score: f64,
    pub high_liberation_discount: f64,
    /// Discounts never take the threshold below this
    pub threshold_floor: f64,
    pub min_title_chars: usize,
    pub min_description_chars: usize,
    /// Every principle score a proposal needs to be liberation compliant
    pub liberation_compliance_floor: f64,
    /// Requirements every voter must meet
    pub eligibility_requirements: Vec<String>,
    /// Extra requirements for governance-rule proposals
    pub governance_rule_requirements: Vec<String>,
    /// Extra requirements for creator disputes
    pub creator_dispute_requirements: Vec<String>,
}

impl VotingPolicy {
    /// Eligibility requirements for a proposal type.
    pub fn requirements_for(&self, proposal_type: ProposalType) -> Vec<String> {
        let mut requirements = self.eligibility_requirements.clone();
        match proposal_type {
            ProposalType::GovernanceRule => {
                requirements.extend(self.governance_rule_requirements.iter().cloned())
            }
            ProposalType::CreatorDispute => {
                requirements.extend(self.creator_dispute_requirements.iter().cloned())
            }
            ProposalType::PlatformChange | ProposalType::LiberationStandard => {}
        }
        requirements
    }
}

impl Default for VotingPolicy {
    fn default() -> Self {
        Self {
            default_quorum: 0.30,
            default_threshold: 0.60,
            voting_period_days: 14,
            liberation_weighted: true,
            governance_rule_quorum: 0.40,
            governance_rule_threshold: 0.67,
            creator_dispute_threshold: 0.75,
            high_liberation_score: 0.9,
            high_liberation_discount: 0.05,
            threshold_floor: 0.50,
            min_title_chars: 10,
            min_description_chars: 100,
            liberation_compliance_floor: 0.6,
            eligibility_requirements: vec![
                "verified_community_member".to_string(),
                "community_agreements_accepted".to_string(),
            ],
            governance_rule_requirements: vec!["membership_tenure_30_days".to_string()],
            creator_dispute_requirements: vec!["dispute_context_reviewed".to_string()],
        }
    }
}

/// Appeal eligibility rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct AppealRules {
    /// Lowest liberation score a rejected operation may appeal from
    pub min_liberation_score: f64,
    pub window_days: u32,
}

impl Default for AppealRules {
    fn default() -> Self {
        Self {
            min_liberation_score: 0.6,
            window_days: 30,
        }
    }
}

impl GovernanceRules {
    /// Load rules from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, RulesError> {
        serde_yaml::from_str(yaml).map_err(|e| RulesError::Parse(e.to_string()))
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// SHA-256 of the canonical JSON encoding, for audit records.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        compute_hash(json.as_bytes())
    }

    /// Check every weight vector, range and cross-setting constraint.
    pub fn validate(&self) -> Result<(), RulesError> {
        let policy = &self.policy;
        for principle in LiberationPrinciple::all() {
            check_fraction(
                &format!("policy.weights.{}", principle.as_str()),
                policy.weights.weight(principle),
            )?;
        }
        check_sum("policy principle", policy.weights.sum())?;

        for (field, value) in [
            ("policy.valid_threshold", policy.valid_threshold),
            ("policy.principle_pass_threshold", policy.principle_pass_threshold),
            ("policy.indicator_bonus", policy.indicator_bonus),
            ("policy.max_indicator_bonus", policy.max_indicator_bonus),
            ("policy.counter_indicator_penalty", policy.counter_indicator_penalty),
            ("policy.max_counter_penalty", policy.max_counter_penalty),
            ("policy.revenue_blend", policy.revenue_blend),
            ("policy.mutual_aid_blend", policy.mutual_aid_blend),
            ("policy.mutual_aid_target", policy.mutual_aid_target),
            ("policy.impact_drift_tolerance", policy.impact_drift_tolerance),
        ] {
            check_fraction(field, value)?;
        }
        if policy.mutual_aid_target <= 0.0 {
            return Err(RulesError::Inconsistent(
                "policy.mutual_aid_target must be positive".to_string(),
            ));
        }

        let sovereignty = &self.sovereignty;
        let narrative = &sovereignty.narrative_weights;
        for (field, value) in [
            ("sovereignty.min_creator_revenue_share", sovereignty.min_creator_revenue_share),
            ("sovereignty.min_narrative_control", sovereignty.min_narrative_control),
            ("sovereignty.min_consent_score", sovereignty.min_consent_score),
            ("sovereignty.scope_unlock_threshold", sovereignty.scope_unlock_threshold),
            ("sovereignty.narrative_weights.ownership", narrative.ownership),
            ("sovereignty.narrative_weights.distribution_control", narrative.distribution_control),
            ("sovereignty.narrative_weights.editing_rights", narrative.editing_rights),
            (
                "sovereignty.narrative_weights.cultural_authenticity",
                narrative.cultural_authenticity,
            ),
        ] {
            check_fraction(field, value)?;
        }
        check_sum("narrative control", narrative.sum())?;
        if sovereignty.min_creator_revenue_share <= 0.0 {
            return Err(RulesError::Inconsistent(
                "sovereignty.min_creator_revenue_share must be positive".to_string(),
            ));
        }
        if sovereignty.consent_validity_days == 0 {
            return Err(RulesError::Inconsistent(
                "sovereignty.consent_validity_days must be at least 1".to_string(),
            ));
        }

        check_fraction("data_consent.min_consent_level", self.data_consent.min_consent_level)?;

        let safety = &self.safety;
        for (field, value) in [
            ("safety.base_confidence", safety.base_confidence),
            ("safety.community_context_bonus", safety.community_context_bonus),
            ("safety.safe_confidence_ceiling", safety.safe_confidence_ceiling),
            ("safety.auto_reject_confidence", safety.auto_reject_confidence),
        ] {
            check_fraction(field, value)?;
        }

        let voting = &self.voting;
        for (field, value) in [
            ("voting.default_quorum", voting.default_quorum),
            ("voting.default_threshold", voting.default_threshold),
            ("voting.governance_rule_quorum", voting.governance_rule_quorum),
            ("voting.governance_rule_threshold", voting.governance_rule_threshold),
            ("voting.creator_dispute_threshold", voting.creator_dispute_threshold),
            ("voting.high_liberation_score", voting.high_liberation_score),
            ("voting.high_liberation_discount", voting.high_liberation_discount),
            ("voting.threshold_floor", voting.threshold_floor),
            ("voting.liberation_compliance_floor", voting.liberation_compliance_floor),
        ] {
            check_fraction(field, value)?;
        }
        if voting.voting_period_days == 0 {
            return Err(RulesError::Inconsistent(
                "voting.voting_period_days must be at least 1".to_string(),
            ));
        }
        if voting.threshold_floor > voting.default_threshold {
            return Err(RulesError::Inconsistent(format!(
                "voting.threshold_floor {:.2} exceeds default threshold {:.2}",
                voting.threshold_floor, voting.default_threshold
            )));
        }
        if voting.governance_rule_quorum < voting.default_quorum
            || voting.governance_rule_threshold < voting.default_threshold
        {
            return Err(RulesError::Inconsistent(
                "governance-rule floors must not be below the default quorum and threshold"
                    .to_string(),
            ));
        }
        if voting.governance_rule_threshold - voting.high_liberation_discount
            < voting.default_threshold - WEIGHT_SUM_TOLERANCE
        {
            return Err(RulesError::Inconsistent(format!(
                "liberation discount {:.2} takes governance-rule threshold below {:.2}",
                voting.high_liberation_discount, voting.default_threshold
            )));
        }

        check_fraction("appeal.min_liberation_score", self.appeal.min_liberation_score)?;
        if self.appeal.min_liberation_score >= policy.valid_threshold {
            return Err(RulesError::Inconsistent(format!(
                "appeal.min_liberation_score {:.2} must be below policy.valid_threshold {:.2}",
                self.appeal.min_liberation_score, policy.valid_threshold
            )));
        }
        if self.appeal.window_days == 0 {
            return Err(RulesError::Inconsistent(
                "appeal.window_days must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_fraction(field: &str, value: f64) -> Result<(), RulesError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(RulesError::OutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_sum(group: &str, sum: f64) -> Result<(), RulesError> {
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(RulesError::WeightsNotNormalized {
            group: group.to_string(),
            sum,
        });
    }
    Ok(())
}

/// Compute SHA256 hash of content.
pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        assert_eq!(GovernanceRules::default().validate(), Ok(()));
    }

    #[test]
    fn test_principle_weights_sum_to_one() {
        let weights = PrincipleWeights::default();
        assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!((NarrativeWeights::default().sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn test_unnormalized_weights_rejected() {
        let mut rules = GovernanceRules::default();
        rules.policy.weights.mutual_aid = 0.2;

        match rules.validate() {
            Err(RulesError::WeightsNotNormalized { group, sum }) => {
                assert_eq!(group, "policy principle");
                assert!((sum - 1.1).abs() < 1e-9);
            }
            other => panic!("expected weight error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut rules = GovernanceRules::default();
        rules.sovereignty.min_narrative_control = 1.2;
        assert!(matches!(
            rules.validate(),
            Err(RulesError::OutOfRange { ref field, .. })
                if field == "sovereignty.min_narrative_control"
        ));
    }

    #[test]
    fn test_discount_cannot_undercut_governance_floor() {
        let mut rules = GovernanceRules::default();
        rules.voting.high_liberation_discount = 0.10;
        assert!(matches!(rules.validate(), Err(RulesError::Inconsistent(_))));
    }

    #[test]
    fn test_empty_appeal_band_rejected() {
        let mut rules = GovernanceRules::default();
        rules.appeal.min_liberation_score = 0.7;
        assert!(matches!(rules.validate(), Err(RulesError::Inconsistent(_))));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let rules = GovernanceRules::default();
        let yaml = rules.to_yaml().unwrap();
        let parsed = GovernanceRules::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, rules);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let rules = GovernanceRules::from_yaml(
            "version: \"2.1.0\"\nsovereignty:\n  min_creator_revenue_share: 0.8\n",
        )
        .unwrap();
        assert_eq!(rules.version, "2.1.0");
        assert_eq!(rules.sovereignty.min_creator_revenue_share, 0.8);
        assert_eq!(rules.sovereignty.min_narrative_control, 0.80);
        assert_eq!(rules.voting.default_quorum, 0.30);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let rules = GovernanceRules::default();
        assert_eq!(rules.fingerprint(), GovernanceRules::default().fingerprint());
        assert_eq!(rules.fingerprint().len(), 64);

        let mut changed = rules.clone();
        changed.voting.default_quorum = 0.35;
        assert_ne!(rules.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn test_requirements_per_proposal_type() {
        let voting = VotingPolicy::default();
        assert_eq!(voting.requirements_for(ProposalType::PlatformChange).len(), 2);
        assert!(voting
            .requirements_for(ProposalType::GovernanceRule)
            .contains(&"membership_tenure_30_days".to_string()));
    }
}
