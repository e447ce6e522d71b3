//! Proposal validation and voting rules.

use std::sync::Arc;
use tracing::{debug, info, warn};

use charter::{
    CommunityProposal, GovernanceRules, LiberationImpact, ProposalType, ValidationError,
};

use crate::clock::Clock;
use crate::evaluators::{Evaluator, PolicyScorer};
use crate::proposal::MemberRegistry;
use crate::types::{
    ProposalValidation, Result, SpecialRight, VoteEligibility, VoteResult, VotingRuleType,
    VotingRules,
};

/// Decides whether a proposal may go to a vote and under which rules.
pub struct ProposalGovernor {
    rules: Arc<GovernanceRules>,
    scorer: PolicyScorer,
    registry: Arc<dyn MemberRegistry>,
    clock: Arc<dyn Clock>,
}

impl ProposalGovernor {
    pub fn new(
        rules: Arc<GovernanceRules>,
        registry: Arc<dyn MemberRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scorer: PolicyScorer::new(rules.clone()),
            rules,
            registry,
            clock,
        }
    }

    /// Govern a proposal.
    ///
    /// Invalid proposals are returned unapproved with every failure listed in
    /// `reason`, and the member registry is not consulted.
    pub async fn govern(&self, proposal: &CommunityProposal) -> Result<VoteResult> {
        let validation = self.validate(proposal)?;

        if !validation.valid {
            let reason = validation.errors.join("; ");
            info!(
                proposal_id = %proposal.id,
                reason = %reason,
                "Proposal rejected before voting"
            );
            return Ok(VoteResult {
                proposal_id: proposal.id.clone(),
                approved: false,
                voting_rules: None,
                required_quorum: None,
                passing_threshold: None,
                proposal_validation: validation,
                vote_eligibility: None,
                reason: Some(reason),
            });
        }

        let impact = liberation_impact(proposal)?;
        let voting_rules = self.voting_rules(proposal, &impact);
        let vote_eligibility = self
            .resolve_eligibility(proposal, voting_rules.eligibility_requirements.clone())
            .await?;

        info!(
            proposal_id = %proposal.id,
            proposal_type = proposal.proposal_type.as_str(),
            quorum = voting_rules.quorum,
            threshold = voting_rules.passing_threshold,
            eligible = vote_eligibility.eligible_voters.len(),
            "Proposal approved for voting"
        );

        Ok(VoteResult {
            proposal_id: proposal.id.clone(),
            approved: true,
            required_quorum: Some(voting_rules.quorum),
            passing_threshold: Some(voting_rules.passing_threshold),
            voting_rules: Some(voting_rules),
            proposal_validation: validation,
            vote_eligibility: Some(vote_eligibility),
            reason: None,
        })
    }

    /// Validate form and liberation compliance.
    pub fn validate(&self, proposal: &CommunityProposal) -> Result<ProposalValidation> {
        let voting = &self.rules.voting;

        let impact = liberation_impact(proposal)?;
        let liberation = self
            .scorer
            .score_impact(&proposal.description, &impact, None);

        let mut errors = Vec::new();

        let title_chars = proposal.title.trim().chars().count();
        if title_chars < voting.min_title_chars {
            errors.push(format!(
                "Title must be at least {} characters (has {})",
                voting.min_title_chars, title_chars
            ));
        }
        let description_chars = proposal.description.trim().chars().count();
        if description_chars < voting.min_description_chars {
            errors.push(format!(
                "Description must be at least {} characters (has {})",
                voting.min_description_chars, description_chars
            ));
        }
        if proposal.deadline <= self.clock.now() {
            errors.push(format!(
                "Deadline {} is not in the future",
                proposal.deadline.to_rfc3339()
            ));
        }
        let form_valid = errors.is_empty();

        let below_floor: Vec<&str> = liberation
            .principle_scores
            .iter()
            .filter(|(_, score)| **score < voting.liberation_compliance_floor)
            .map(|(principle, _)| principle.as_str())
            .collect();
        let liberation_compliant = below_floor.is_empty();
        if !liberation_compliant {
            errors.push(format!(
                "Liberation compliance requires every principle at {:.2} or above; below: {}",
                voting.liberation_compliance_floor,
                below_floor.join(", ")
            ));
        }

        debug!(
            proposal_id = %proposal.id,
            form_valid = form_valid,
            liberation_compliant = liberation_compliant,
            "Proposal validated"
        );

        Ok(ProposalValidation {
            valid: form_valid && liberation_compliant,
            form_valid,
            liberation_compliant,
            errors,
            liberation,
        })
    }

    /// Voting rules for a proposal given its reported liberation impact.
    ///
    /// Governance-rule floors apply first, then the high-liberation discount
    /// keyed on the reported overall score; a creator dispute always ends at
    /// the fixed dispute threshold.
    pub fn voting_rules(
        &self,
        proposal: &CommunityProposal,
        impact: &LiberationImpact,
    ) -> VotingRules {
        let voting = &self.rules.voting;
        let proposal_type = proposal.proposal_type;

        let mut quorum = voting.default_quorum;
        let mut threshold = voting.default_threshold;

        if proposal_type == ProposalType::GovernanceRule {
            quorum = quorum.max(voting.governance_rule_quorum);
            threshold = threshold.max(voting.governance_rule_threshold);
        }
        if impact.overall_score > voting.high_liberation_score {
            threshold = (threshold - voting.high_liberation_discount).max(voting.threshold_floor);
        }
        if proposal_type == ProposalType::CreatorDispute {
            threshold = voting.creator_dispute_threshold;
        }

        let rule_type = match proposal_type {
            ProposalType::GovernanceRule => VotingRuleType::Supermajority,
            ProposalType::CreatorDispute => VotingRuleType::DisputeResolution,
            ProposalType::LiberationStandard => VotingRuleType::LiberationStandard,
            ProposalType::PlatformChange => VotingRuleType::Standard,
        };

        VotingRules {
            rule_type,
            vote_type: proposal.requested_vote_type,
            quorum: round_to_rule_precision(quorum),
            passing_threshold: round_to_rule_precision(threshold),
            voting_period_days: voting.voting_period_days,
            eligibility_requirements: voting.requirements_for(proposal_type),
            liberation_weighted: voting.liberation_weighted,
        }
    }

    async fn resolve_eligibility(
        &self,
        proposal: &CommunityProposal,
        requirements: Vec<String>,
    ) -> Result<VoteEligibility> {
        let roll = self.registry.resolve_eligible_voters(proposal).await?;
        let mut special_rights = roll.special_rights;

        if proposal.proposal_type == ProposalType::CreatorDispute {
            for party in &proposal.affected_parties {
                if !roll.eligible.contains(party) {
                    warn!(
                        proposal_id = %proposal.id,
                        party = %party,
                        registry = self.registry.name(),
                        "Affected party is not an eligible voter; no veto granted"
                    );
                    continue;
                }
                let rights = special_rights.entry(party.clone()).or_default();
                if !rights.contains(&SpecialRight::Veto) {
                    rights.push(SpecialRight::Veto);
                }
            }
        }

        Ok(VoteEligibility {
            eligible_voters: roll.eligible,
            ineligible_voters: roll.ineligible,
            special_rights,
            requirements,
        })
    }
}

fn liberation_impact(proposal: &CommunityProposal) -> Result<LiberationImpact> {
    let impact = proposal
        .liberation_impact
        .as_ref()
        .ok_or_else(|| ValidationError::missing("proposal.liberation_impact"))?
        .normalized("proposal.liberation_impact")?;
    Ok(impact)
}

/// Rules are configured to four decimal places.
fn round_to_rule_precision(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[async_trait::async_trait]
impl Evaluator<CommunityProposal> for ProposalGovernor {
    type Verdict = VoteResult;

    fn name(&self) -> &str {
        "proposal_governor"
    }

    async fn evaluate(&self, proposal: &CommunityProposal) -> Result<VoteResult> {
        self.govern(proposal).await
    }
}
