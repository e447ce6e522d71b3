//! Ballot counting against computed voting rules.

use std::collections::HashSet;
use tracing::{info, warn};

use charter::ValidationError;

use crate::types::{
    Ballot, Result, SpecialRight, TallyOutcome, TallyResult, VoteChoice, VoteEligibility,
    VoteResult,
};

/// Tally ballots for a proposal that was approved for voting.
///
/// Ballots from voters outside the eligible roll and repeat ballots are
/// discarded; the first ballot from each voter counts. A veto outranks
/// quorum, which outranks the approval threshold.
pub fn tally(result: &VoteResult, ballots: &[Ballot]) -> Result<TallyResult> {
    let (rules, eligibility) = match (&result.voting_rules, &result.vote_eligibility) {
        (Some(rules), Some(eligibility)) if result.approved => (rules, eligibility),
        _ => {
            return Err(ValidationError::new(
                "vote_result",
                format!("proposal {} was not approved for voting", result.proposal_id),
            )
            .into())
        }
    };

    let mut seen = HashSet::new();
    let mut approve_weight = 0.0;
    let mut reject_weight = 0.0;
    let mut abstain_count = 0;
    let mut vetoed_by = Vec::new();
    let mut discarded_ballots = 0;

    for ballot in ballots {
        if !eligibility.is_eligible(&ballot.voter_id) || !seen.insert(ballot.voter_id.as_str()) {
            discarded_ballots += 1;
            continue;
        }

        let weight = if rules.liberation_weighted {
            vote_weight(eligibility, &ballot.voter_id)
        } else {
            1.0
        };

        match ballot.choice {
            VoteChoice::Approve => approve_weight += weight,
            VoteChoice::Reject => {
                reject_weight += weight;
                if eligibility
                    .rights_of(&ballot.voter_id)
                    .contains(&SpecialRight::Veto)
                {
                    vetoed_by.push(ballot.voter_id.clone());
                }
            }
            VoteChoice::Abstain => abstain_count += 1,
        }
    }

    let eligible_count = eligibility
        .eligible_voters
        .iter()
        .collect::<HashSet<_>>()
        .len();
    let participant_count = seen.len();
    let participation = if eligible_count == 0 {
        0.0
    } else {
        participant_count as f64 / eligible_count as f64
    };
    let quorum_met = eligible_count > 0 && participation >= rules.quorum;

    let decisive = approve_weight + reject_weight;
    let approval_ratio = if decisive > 0.0 {
        approve_weight / decisive
    } else {
        0.0
    };

    let outcome = if !vetoed_by.is_empty() {
        TallyOutcome::Vetoed
    } else if !quorum_met {
        TallyOutcome::QuorumNotMet
    } else if approval_ratio >= rules.passing_threshold {
        TallyOutcome::Passed
    } else {
        TallyOutcome::Failed
    };

    if discarded_ballots > 0 {
        warn!(
            proposal_id = %result.proposal_id,
            discarded = discarded_ballots,
            "Discarded ineligible or repeat ballots"
        );
    }

    info!(
        proposal_id = %result.proposal_id,
        outcome = ?outcome,
        participation = participation,
        approval_ratio = approval_ratio,
        "Votes tallied"
    );

    Ok(TallyResult {
        proposal_id: result.proposal_id.clone(),
        outcome,
        eligible_count,
        participant_count,
        participation,
        quorum_met,
        approve_weight,
        reject_weight,
        abstain_count,
        approval_ratio,
        vetoed_by,
        discarded_ballots,
    })
}

fn vote_weight(eligibility: &VoteEligibility, voter_id: &str) -> f64 {
    eligibility
        .rights_of(voter_id)
        .iter()
        .find_map(|right| match right {
            SpecialRight::WeightedVote { weight } => Some(weight.max(0.0)),
            SpecialRight::Veto => None,
        })
        .unwrap_or(1.0)
}
