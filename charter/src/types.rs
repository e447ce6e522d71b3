//! Input descriptors for the governance decision engine.
//!
//! Callers build one descriptor per request. Descriptors are never mutated by
//! the engine; evaluators work on normalized copies (fractions clamped to
//! `[0, 1]`) produced by the `normalized` helpers below.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for the platform frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Tolerance for "fractions of one operation sum to 1".
pub const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

/// Malformed or incomplete input descriptor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// A required sub-object is absent.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "required but missing")
    }
}

/// Clamp a fraction into `[0, 1]`, rejecting non-finite values.
pub fn clamp_fraction(field: &str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, format!("must be a finite number, got {}", value)));
    }
    Ok(value.clamp(0.0, 1.0))
}

/// How revenue from one operation is split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct EconomicImpact {
    /// Fraction going to the creator
    pub creator_revenue_share: f64,
    /// Fraction going to the community
    pub community_share: f64,
    /// Fraction retained by the platform
    pub platform_share: f64,
    /// Fraction routed to the mutual-aid fund
    pub mutual_aid_fund: f64,
    /// Fraction reinvested in liberation work
    pub liberation_investment: f64,
}

impl EconomicImpact {
    /// Sum of all five fractions.
    pub fn total(&self) -> f64 {
        self.creator_revenue_share
            + self.community_share
            + self.platform_share
            + self.mutual_aid_fund
            + self.liberation_investment
    }

    /// Clamp every fraction and check that they sum to one.
    pub fn normalized(&self, field: &str) -> Result<Self, ValidationError> {
        let normalized = Self {
            creator_revenue_share: clamp_fraction(
                &format!("{}.creator_revenue_share", field),
                self.creator_revenue_share,
            )?,
            community_share: clamp_fraction(
                &format!("{}.community_share", field),
                self.community_share,
            )?,
            platform_share: clamp_fraction(
                &format!("{}.platform_share", field),
                self.platform_share,
            )?,
            mutual_aid_fund: clamp_fraction(
                &format!("{}.mutual_aid_fund", field),
                self.mutual_aid_fund,
            )?,
            liberation_investment: clamp_fraction(
                &format!("{}.liberation_investment", field),
                self.liberation_investment,
            )?,
        };

        let total = normalized.total();
        if (total - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(ValidationError::new(
                field,
                format!("revenue fractions must sum to 1.0, got {:.4}", total),
            ));
        }

        Ok(normalized)
    }
}

/// Caller-supplied liberation sub-scores for an operation or proposal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct LiberationImpact {
    pub creator_empowerment: f64,
    pub community_liberation: f64,
    pub oppression_resistance: f64,
    pub power_building: f64,
    pub mutual_aid: f64,
    /// Precomputed overall score from the caller
    pub overall_score: f64,
}

impl LiberationImpact {
    /// Same score on every dimension, overall included.
    pub fn uniform(score: f64) -> Self {
        Self {
            creator_empowerment: score,
            community_liberation: score,
            oppression_resistance: score,
            power_building: score,
            mutual_aid: score,
            overall_score: score,
        }
    }

    /// Clamp every sub-score into `[0, 1]`.
    pub fn normalized(&self, field: &str) -> Result<Self, ValidationError> {
        let f = |name: &str, v: f64| clamp_fraction(&format!("{}.{}", field, name), v);
        Ok(Self {
            creator_empowerment: f("creator_empowerment", self.creator_empowerment)?,
            community_liberation: f("community_liberation", self.community_liberation)?,
            oppression_resistance: f("oppression_resistance", self.oppression_resistance)?,
            power_building: f("power_building", self.power_building)?,
            mutual_aid: f("mutual_aid", self.mutual_aid)?,
            overall_score: f("overall_score", self.overall_score)?,
        })
    }
}

/// A proposed platform operation to be scored against liberation principles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct OperationDescriptor {
    /// Free-text description of the operation
    pub description: String,
    #[serde(default)]
    pub affected_communities: Vec<String>,
    #[serde(default)]
    pub affected_creators: Vec<String>,
    #[serde(default)]
    pub economic_impact: Option<EconomicImpact>,
    #[serde(default)]
    pub liberation_impact: Option<LiberationImpact>,
}

impl OperationDescriptor {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            affected_communities: Vec::new(),
            affected_creators: Vec::new(),
            economic_impact: None,
            liberation_impact: None,
        }
    }

    pub fn with_economic_impact(mut self, impact: EconomicImpact) -> Self {
        self.economic_impact = Some(impact);
        self
    }

    pub fn with_liberation_impact(mut self, impact: LiberationImpact) -> Self {
        self.liberation_impact = Some(impact);
        self
    }

    pub fn with_creator(mut self, creator_id: impl Into<String>) -> Self {
        self.affected_creators.push(creator_id.into());
        self
    }

    pub fn with_community(mut self, community_id: impl Into<String>) -> Self {
        self.affected_communities.push(community_id.into());
        self
    }
}

/// How a piece of creator content lands culturally.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ContentImpact {
    pub narrative_control: f64,
    pub cultural_significance: f64,
    pub community_resonance: f64,
    pub liberation_messaging: f64,
}

impl ContentImpact {
    pub fn normalized(&self, field: &str) -> Result<Self, ValidationError> {
        let f = |name: &str, v: f64| clamp_fraction(&format!("{}.{}", field, name), v);
        Ok(Self {
            narrative_control: f("narrative_control", self.narrative_control)?,
            cultural_significance: f("cultural_significance", self.cultural_significance)?,
            community_resonance: f("community_resonance", self.community_resonance)?,
            liberation_messaging: f("liberation_messaging", self.liberation_messaging)?,
        })
    }
}

/// Who controls the story told by a piece of content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct NarrativeControl {
    /// Creator owns the work
    pub creator_ownership: bool,
    /// IDs holding editing rights
    #[serde(default)]
    pub editing_rights: Vec<String>,
    /// Creator decides where the work is distributed
    pub distribution_control: bool,
    /// Cultural authenticity (0.0 - 1.0)
    pub cultural_authenticity: f64,
}

/// Consent scopes a creator can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ConsentScope {
    ContentUsage,
    Attribution,
    Distribution,
    Modification,
    RevenueSharing,
    FinancialReporting,
    CulturalContext,
    MovementAssociation,
    OwnershipRights,
}

impl ConsentScope {
    /// Scopes every creator action requires.
    pub fn base() -> Vec<Self> {
        vec![
            Self::ContentUsage,
            Self::Attribution,
            Self::Distribution,
            Self::Modification,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentUsage => "content_usage",
            Self::Attribution => "attribution",
            Self::Distribution => "distribution",
            Self::Modification => "modification",
            Self::RevenueSharing => "revenue_sharing",
            Self::FinancialReporting => "financial_reporting",
            Self::CulturalContext => "cultural_context",
            Self::MovementAssociation => "movement_association",
            Self::OwnershipRights => "ownership_rights",
        }
    }
}

/// What the creator agreed to, and how.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ConsentStatus {
    pub explicit: bool,
    pub informed: bool,
    /// Consent is continuing rather than one-off; continuing consent must be renewed
    pub ongoing: bool,
    pub withdrawable: bool,
    pub consent_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scope: Vec<ConsentScope>,
}

/// A creator action (publish, monetize, license) to be checked for sovereignty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CreatorActionDescriptor {
    pub creator_id: String,
    #[serde(default)]
    pub content_impact: ContentImpact,
    #[serde(default)]
    pub economic_impact: Option<EconomicImpact>,
    #[serde(default)]
    pub narrative_control: NarrativeControl,
    #[serde(default)]
    pub consent_status: ConsentStatus,
}

/// Sensitivity tier of community data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SensitivityTier {
    Public,
    Community,
    Private,
}

impl SensitivityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Community => "community",
            Self::Private => "private",
        }
    }
}

/// Consent grants relevant to a data operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum DataConsent {
    /// Ordinary creator consent
    Creator,
    /// Explicit, per-use creator consent
    ExplicitCreator,
    /// Community consent through its usual process
    Community,
    /// Explicit community consent
    ExplicitCommunity,
    /// Joint consent of every creator involved
    MultiCreator,
}

impl DataConsent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::ExplicitCreator => "explicit_creator",
            Self::Community => "community",
            Self::ExplicitCommunity => "explicit_community",
            Self::MultiCreator => "multi_creator",
        }
    }
}

/// A data access operation on community-held data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CommunityDataDescriptor {
    pub data_type: String,
    pub sensitivity: SensitivityTier,
    #[serde(default)]
    pub creator_ids: Vec<String>,
    #[serde(default)]
    pub community_ids: Vec<String>,
    #[serde(default)]
    pub consent_required: bool,
    /// Consent grants the caller has on record
    #[serde(default)]
    pub obtained_consent: Vec<DataConsent>,
}

/// Content submitted for harmful-pattern screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ContentDescriptor {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub creator_id: String,
    /// Communities whose context accompanies the content
    #[serde(default)]
    pub community_context: Vec<String>,
}

impl ContentDescriptor {
    pub fn new(creator_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
            creator_id: creator_id.into(),
            community_context: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_community_context(mut self, community_id: impl Into<String>) -> Self {
        self.community_context.push(community_id.into());
        self
    }
}

/// Kind of community proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    GovernanceRule,
    PlatformChange,
    CreatorDispute,
    LiberationStandard,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GovernanceRule => "governance_rule",
            Self::PlatformChange => "platform_change",
            Self::CreatorDispute => "creator_dispute",
            Self::LiberationStandard => "liberation_standard",
        }
    }
}

/// Vote type the proposer asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    #[default]
    SimpleMajority,
    Supermajority,
    Consensus,
    LiberationWeighted,
}

/// A community proposal submitted for democratic vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CommunityProposal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub proposal_type: ProposalType,
    pub proposer_id: String,
    #[serde(default)]
    pub liberation_impact: Option<LiberationImpact>,
    #[serde(default)]
    pub requested_vote_type: VoteType,
    pub deadline: DateTime<Utc>,
    /// Parties directly affected (hold veto rights on disputes)
    #[serde(default)]
    pub affected_parties: Vec<String>,
}

impl CommunityProposal {
    /// Create a new proposal with a fresh ID.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        proposal_type: ProposalType,
        proposer_id: impl Into<String>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            proposal_type,
            proposer_id: proposer_id.into(),
            liberation_impact: None,
            requested_vote_type: VoteType::default(),
            deadline,
            affected_parties: Vec::new(),
        }
    }

    pub fn with_liberation_impact(mut self, impact: LiberationImpact) -> Self {
        self.liberation_impact = Some(impact);
        self
    }

    pub fn with_vote_type(mut self, vote_type: VoteType) -> Self {
        self.requested_vote_type = vote_type;
        self
    }

    pub fn with_affected_party(mut self, party_id: impl Into<String>) -> Self {
        self.affected_parties.push(party_id.into());
        self
    }
}
