//! Core types for the decision engine: verdicts, decisions, voting records
//! and errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use charter::{
    CommunityDataDescriptor, ConsentScope, ContentDescriptor, CreatorActionDescriptor,
    DataConsent, LiberationPrinciple, OperationDescriptor, RuleSourceError, RulesError,
    ValidationError, VoteType,
};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Outcome of scoring an operation against the liberation principles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct LiberationValidation {
    /// Overall score meets the valid threshold
    pub valid: bool,
    /// Weighted overall score (0.0 - 1.0)
    pub score: f64,
    pub principle_scores: BTreeMap<LiberationPrinciple, f64>,
    pub passed_principles: Vec<LiberationPrinciple>,
    pub failed_principles: Vec<LiberationPrinciple>,
    /// One line per principle plus the overall verdict
    pub feedback: Vec<String>,
    /// Remediation for each failed principle
    pub recommendations: Vec<String>,
}

/// A consent condition beyond scope coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ConsentCondition {
    Explicit,
    Informed,
    Withdrawable,
    /// Continuing consent renewed within the validity window
    Current,
}

impl ConsentCondition {
    pub fn all() -> [Self; 4] {
        [Self::Explicit, Self::Informed, Self::Withdrawable, Self::Current]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Informed => "informed",
            Self::Withdrawable => "withdrawable",
            Self::Current => "current",
        }
    }
}

/// Creator-sovereignty verdict for a single creator action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SovereigntyDecision {
    pub approved: bool,
    /// False when no creator action was supplied and this is a stand-in
    pub evaluated: bool,
    pub revenue_share_compliant: bool,
    pub narrative_control_maintained: bool,
    pub creator_consent_obtained: bool,
    pub actual_revenue_share: f64,
    pub narrative_control_score: f64,
    pub consent_score: f64,
    pub required_consent: Vec<ConsentScope>,
    pub missing_consent: Vec<ConsentScope>,
    pub failed_conditions: Vec<ConsentCondition>,
    /// Deduplicated remediation for every failing sub-verdict
    pub required_actions: Vec<String>,
    pub summary: String,
}

impl SovereigntyDecision {
    /// Permissive stand-in used when a request carries no creator action.
    pub fn not_applicable() -> Self {
        Self {
            approved: true,
            evaluated: false,
            revenue_share_compliant: true,
            narrative_control_maintained: true,
            creator_consent_obtained: true,
            actual_revenue_share: 0.0,
            narrative_control_score: 1.0,
            consent_score: 1.0,
            required_consent: vec![],
            missing_consent: vec![],
            failed_conditions: vec![],
            required_actions: vec![],
            summary: "No creator action in request".to_string(),
        }
    }
}

/// Consent verdict for a community data operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ConsentValidation {
    pub approved: bool,
    pub evaluated: bool,
    /// Fraction of required consent that was obtained
    pub consent_level: f64,
    pub required_consent: Vec<DataConsent>,
    pub obtained_consent: Vec<DataConsent>,
    pub missing_consent: Vec<DataConsent>,
    pub summary: String,
}

impl ConsentValidation {
    /// Permissive stand-in used when a request carries no data operation.
    pub fn not_applicable() -> Self {
        Self {
            approved: true,
            evaluated: false,
            consent_level: 1.0,
            required_consent: vec![],
            obtained_consent: vec![],
            missing_consent: vec![],
            summary: "No community data access in request".to_string(),
        }
    }
}

/// Harmful-pattern categories the content classifier reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum HarmCategory {
    Racist,
    Homophobic,
    Transphobic,
    Classist,
    Sexist,
    Ableist,
    Exploitative,
}

impl HarmCategory {
    pub fn all() -> [Self; 7] {
        [
            Self::Racist,
            Self::Homophobic,
            Self::Transphobic,
            Self::Classist,
            Self::Sexist,
            Self::Ableist,
            Self::Exploitative,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Racist => "racist",
            Self::Homophobic => "homophobic",
            Self::Transphobic => "transphobic",
            Self::Classist => "classist",
            Self::Sexist => "sexist",
            Self::Ableist => "ableist",
            Self::Exploitative => "exploitative",
        }
    }

    /// Guidance attached to content flagged in this category.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Racist => {
                "Remove racist framing and seek review from affected communities of color"
            }
            Self::Homophobic => {
                "Remove homophobic language and review with queer community moderators"
            }
            Self::Transphobic => {
                "Remove transphobic framing and review with trans community moderators"
            }
            Self::Classist => "Reframe content that blames poverty on the poor",
            Self::Sexist => "Remove sexist stereotypes about women and gender roles",
            Self::Ableist => "Replace ableist language with disability-affirming terms",
            Self::Exploitative => "Offer fair compensation and keep rights with the creator",
        }
    }
}

/// Severity of detected harm, by number of categories matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// 0 categories → low, 1 → medium, 2 → high, 3 or more → critical.
    pub fn from_category_count(count: usize) -> Self {
        match count {
            0 => Self::Low,
            1 => Self::Medium,
            2 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Content-safety verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct OppressionCheck {
    pub safe: bool,
    pub evaluated: bool,
    pub detected_categories: Vec<HarmCategory>,
    /// Signals that matched, per category
    pub matched_signals: BTreeMap<HarmCategory, Vec<String>>,
    pub severity: Severity,
    pub confidence: f64,
    /// Severe or confident enough to reject without further review
    pub automatic_rejection: bool,
    pub recommendations: Vec<String>,
}

impl OppressionCheck {
    /// Permissive stand-in used when a request carries no content.
    pub fn not_applicable() -> Self {
        Self {
            safe: true,
            evaluated: false,
            detected_categories: vec![],
            matched_signals: BTreeMap::new(),
            severity: Severity::Low,
            confidence: 0.0,
            automatic_rejection: false,
            recommendations: vec!["No content in request".to_string()],
        }
    }
}

/// Kind of voting rule applied to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum VotingRuleType {
    Standard,
    Supermajority,
    DisputeResolution,
    LiberationStandard,
}

/// Voting rules computed for a valid proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VotingRules {
    pub rule_type: VotingRuleType,
    /// Vote type the proposer requested
    pub vote_type: VoteType,
    /// Fraction of eligible voters that must participate
    pub quorum: f64,
    /// Fraction of decisive votes that must approve
    pub passing_threshold: f64,
    pub voting_period_days: u32,
    pub eligibility_requirements: Vec<String>,
    pub liberation_weighted: bool,
}

/// Rights a voter holds beyond a plain vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecialRight {
    /// Vote counts with this weight in liberation-weighted votes
    WeightedVote { weight: f64 },
    /// A reject ballot blocks the proposal
    Veto,
}

/// Voter roll as resolved by the member registry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VoterRoll {
    pub eligible: Vec<String>,
    pub ineligible: Vec<String>,
    pub special_rights: BTreeMap<String, Vec<SpecialRight>>,
}

/// Eligibility packaged for a proposal vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VoteEligibility {
    pub eligible_voters: Vec<String>,
    pub ineligible_voters: Vec<String>,
    pub special_rights: BTreeMap<String, Vec<SpecialRight>>,
    /// Requirements the registry applied
    pub requirements: Vec<String>,
}

impl VoteEligibility {
    pub fn is_eligible(&self, voter_id: &str) -> bool {
        self.eligible_voters.iter().any(|v| v == voter_id)
    }

    pub fn rights_of(&self, voter_id: &str) -> &[SpecialRight] {
        self.special_rights
            .get(voter_id)
            .map(|rights| rights.as_slice())
            .unwrap_or(&[])
    }
}

/// Form and liberation validation of a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ProposalValidation {
    pub valid: bool,
    pub form_valid: bool,
    pub liberation_compliant: bool,
    pub errors: Vec<String>,
    pub liberation: LiberationValidation,
}

/// Result of governing a community proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VoteResult {
    pub proposal_id: String,
    /// Proposal may go to a vote
    pub approved: bool,
    pub voting_rules: Option<VotingRules>,
    pub required_quorum: Option<f64>,
    pub passing_threshold: Option<f64>,
    pub proposal_validation: ProposalValidation,
    pub vote_eligibility: Option<VoteEligibility>,
    pub reason: Option<String>,
}

/// A voter's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Approve,
    Reject,
    Abstain,
}

/// A cast ballot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Ballot {
    pub voter_id: String,
    pub choice: VoteChoice,
}

impl Ballot {
    pub fn new(voter_id: impl Into<String>, choice: VoteChoice) -> Self {
        Self {
            voter_id: voter_id.into(),
            choice,
        }
    }
}

/// Final state of a tallied vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum TallyOutcome {
    Passed,
    Failed,
    QuorumNotMet,
    Vetoed,
}

/// Tally of ballots against computed voting rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct TallyResult {
    pub proposal_id: String,
    pub outcome: TallyOutcome,
    pub eligible_count: usize,
    pub participant_count: usize,
    pub participation: f64,
    pub quorum_met: bool,
    pub approve_weight: f64,
    pub reject_weight: f64,
    pub abstain_count: usize,
    pub approval_ratio: f64,
    pub vetoed_by: Vec<String>,
    /// Ballots from ineligible voters or repeat ballots
    pub discarded_ballots: usize,
}

/// A request for a governance decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct GovernanceRequest {
    pub operation: OperationDescriptor,
    #[serde(default)]
    pub creator_action: Option<CreatorActionDescriptor>,
    #[serde(default)]
    pub community_data: Option<CommunityDataDescriptor>,
    #[serde(default)]
    pub content: Option<ContentDescriptor>,
}

impl GovernanceRequest {
    pub fn new(operation: OperationDescriptor) -> Self {
        Self {
            operation,
            creator_action: None,
            community_data: None,
            content: None,
        }
    }

    pub fn with_creator_action(mut self, action: CreatorActionDescriptor) -> Self {
        self.creator_action = Some(action);
        self
    }

    pub fn with_community_data(mut self, data: CommunityDataDescriptor) -> Self {
        self.community_data = Some(data);
        self
    }

    pub fn with_content(mut self, content: ContentDescriptor) -> Self {
        self.content = Some(content);
        self
    }
}

/// The engine's final, immutable decision on a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct GovernanceDecision {
    pub decision_id: String,
    pub decided_at: DateTime<Utc>,
    pub approved: bool,
    pub liberation: LiberationValidation,
    pub sovereignty: SovereigntyDecision,
    pub consent: ConsentValidation,
    pub safety: OppressionCheck,
    /// Never empty
    pub reasons: Vec<String>,
    pub appealable: bool,
    pub appeal_deadline: Option<DateTime<Utc>>,
    pub rules_version: String,
    pub rules_fingerprint: String,
    /// Always true: the caller must hand the decision to the decision store
    pub requires_storage: bool,
}

/// Failure of an external collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// Member registry failed or timed out
    #[error("Member registry failure: {0}")]
    Registry(String),

    /// Decision store failed or timed out
    #[error("Decision store failure: {0}")]
    Store(String),

    /// Content classifier failed
    #[error("Content classifier failure: {0}")]
    Classifier(String),
}

/// Error types for the decision engine.
#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    /// Malformed or incomplete input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rules failed validation
    #[error("Configuration error: {0}")]
    Configuration(#[from] RulesError),

    /// Rules could not be loaded
    #[error("Rule source error: {0}")]
    RuleSource(#[from] RuleSourceError),

    /// A collaborator the operation needs was never configured
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// External dependency failed
    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] CollaboratorError),
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
