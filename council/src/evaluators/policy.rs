//! Liberation-principle scoring.
//!
//! Each principle starts from the caller's liberation sub-score, blends in
//! the economic split where one applies, then moves up or down with the
//! indicator phrases found in the description.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use charter::principles::count_matches;
use charter::{
    EconomicImpact, GovernanceRules, LiberationImpact, LiberationPrinciple, OperationDescriptor,
    ValidationError,
};

use crate::evaluators::Evaluator;
use crate::types::{LiberationValidation, Result};

/// Scores operations against the weighted liberation principles.
pub struct PolicyScorer {
    rules: Arc<GovernanceRules>,
}

impl PolicyScorer {
    pub fn new(rules: Arc<GovernanceRules>) -> Self {
        Self { rules }
    }

    /// Score an operation. Both impact sub-objects are required.
    pub fn score(&self, operation: &OperationDescriptor) -> Result<LiberationValidation> {
        let liberation = operation
            .liberation_impact
            .as_ref()
            .ok_or_else(|| ValidationError::missing("operation.liberation_impact"))?
            .normalized("operation.liberation_impact")?;
        let economics = operation
            .economic_impact
            .as_ref()
            .ok_or_else(|| ValidationError::missing("operation.economic_impact"))?
            .normalized("operation.economic_impact")?;

        Ok(self.score_impact(&operation.description, &liberation, Some(&economics)))
    }

    /// Score already-normalized impacts against a description.
    ///
    /// Without an economic split, each principle is scored from its
    /// liberation sub-score and the description alone.
    pub fn score_impact(
        &self,
        description: &str,
        liberation: &LiberationImpact,
        economics: Option<&EconomicImpact>,
    ) -> LiberationValidation {
        let policy = &self.rules.policy;
        let text = description.to_lowercase();

        let mut principle_scores = BTreeMap::new();
        let mut passed_principles = Vec::new();
        let mut failed_principles = Vec::new();
        let mut feedback = Vec::new();
        let mut recommendations = Vec::new();
        let mut overall = 0.0;

        for principle in LiberationPrinciple::all() {
            let score = self.principle_score(principle, &text, liberation, economics);
            overall += policy.weights.weight(principle) * score;
            principle_scores.insert(principle, score);

            if score >= policy.principle_pass_threshold {
                passed_principles.push(principle);
                feedback.push(format!("{}: {:.2} (passed)", principle.label(), score));
            } else {
                failed_principles.push(principle);
                feedback.push(format!(
                    "{}: {:.2} (below {:.2})",
                    principle.label(),
                    score,
                    policy.principle_pass_threshold
                ));
                recommendations.push(principle.remediation().to_string());
            }
        }

        let score = overall.clamp(0.0, 1.0);
        let valid = score >= policy.valid_threshold;

        feedback.insert(
            0,
            if valid {
                format!(
                    "Overall liberation score {:.2} meets the {:.2} threshold",
                    score, policy.valid_threshold
                )
            } else {
                format!(
                    "Overall liberation score {:.2} is below the {:.2} threshold",
                    score, policy.valid_threshold
                )
            },
        );

        if (liberation.overall_score - score).abs() > policy.impact_drift_tolerance {
            feedback.push(format!(
                "Reported overall score {:.2} differs from the computed {:.2}",
                liberation.overall_score, score
            ));
        }

        if !valid && failed_principles.is_empty() {
            recommendations.push(format!(
                "Strengthen the operation across all principles to reach an overall score of {:.2}",
                policy.valid_threshold
            ));
        }

        debug!(
            score = score,
            valid = valid,
            failed = failed_principles.len(),
            "Liberation principles scored"
        );

        LiberationValidation {
            valid,
            score,
            principle_scores,
            passed_principles,
            failed_principles,
            feedback,
            recommendations,
        }
    }

    fn principle_score(
        &self,
        principle: LiberationPrinciple,
        text: &str,
        liberation: &LiberationImpact,
        economics: Option<&EconomicImpact>,
    ) -> f64 {
        let policy = &self.rules.policy;

        let base = match principle {
            LiberationPrinciple::CreatorEmpowerment => liberation.creator_empowerment,
            LiberationPrinciple::CommunityLiberation => liberation.community_liberation,
            LiberationPrinciple::OppressionResistance => liberation.oppression_resistance,
            LiberationPrinciple::PowerBuilding => liberation.power_building,
            LiberationPrinciple::MutualAid => liberation.mutual_aid,
        };

        let blended = match (principle, economics) {
            (LiberationPrinciple::CreatorEmpowerment, Some(e)) => {
                let share = (e.creator_revenue_share
                    / self.rules.sovereignty.min_creator_revenue_share)
                    .min(1.0);
                blend(base, share, policy.revenue_blend)
            }
            (LiberationPrinciple::MutualAid, Some(e)) => {
                let fund = (e.mutual_aid_fund / policy.mutual_aid_target).min(1.0);
                blend(base, fund, policy.mutual_aid_blend)
            }
            _ => base,
        };

        let bonus = (count_matches(text, principle.indicators()) as f64 * policy.indicator_bonus)
            .min(policy.max_indicator_bonus);
        let penalty = (count_matches(text, principle.counter_indicators()) as f64
            * policy.counter_indicator_penalty)
            .min(policy.max_counter_penalty);

        (blended + bonus - penalty).clamp(0.0, 1.0)
    }
}

fn blend(base: f64, signal: f64, share: f64) -> f64 {
    base * (1.0 - share) + signal * share
}

#[async_trait::async_trait]
impl Evaluator<OperationDescriptor> for PolicyScorer {
    type Verdict = LiberationValidation;

    fn name(&self) -> &str {
        "policy_scorer"
    }

    async fn evaluate(&self, operation: &OperationDescriptor) -> Result<LiberationValidation> {
        self.score(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GovernanceError;

    fn scorer() -> PolicyScorer {
        PolicyScorer::new(Arc::new(GovernanceRules::default()))
    }

    fn split(creator: f64) -> EconomicImpact {
        let rest = 1.0 - creator;
        EconomicImpact {
            creator_revenue_share: creator,
            community_share: rest * 0.5,
            platform_share: rest * 0.2,
            mutual_aid_fund: rest * 0.2,
            liberation_investment: rest * 0.1,
        }
    }

    fn operation(description: &str, creator: f64, scores: f64) -> OperationDescriptor {
        OperationDescriptor::new(description)
            .with_economic_impact(split(creator))
            .with_liberation_impact(LiberationImpact::uniform(scores))
    }

    #[test]
    fn test_aligned_operation_is_valid() {
        let result = scorer()
            .score(&operation("Publish a zine issue", 0.8, 0.85))
            .unwrap();

        assert!(result.valid);
        assert!(result.score >= 0.7);
        assert!(result.failed_principles.is_empty());
        assert_eq!(result.passed_principles.len(), 5);
        assert!(result.recommendations.is_empty());
        assert!(!result.feedback.is_empty());
    }

    #[test]
    fn test_failed_principles_get_remediation() {
        let result = scorer()
            .score(&operation("Launch premium tier", 0.3, 0.4))
            .unwrap();

        assert!(!result.valid);
        assert!(result
            .failed_principles
            .contains(&LiberationPrinciple::CreatorEmpowerment));
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("75% minimum")));
    }

    #[test]
    fn test_indicators_move_scores() {
        let scorer = scorer();
        let plain = scorer.score(&operation("Publish an update", 0.8, 0.6)).unwrap();
        let aligned = scorer
            .score(&operation("Publish a community-led, cooperative update", 0.8, 0.6))
            .unwrap();
        let extractive = scorer
            .score(&operation(
                "Publish an update behind a paywall with user tracking users",
                0.8,
                0.6,
            ))
            .unwrap();

        assert!(aligned.score > plain.score);
        assert!(extractive.score < plain.score);
        assert!(
            aligned.principle_scores[&LiberationPrinciple::PowerBuilding]
                > plain.principle_scores[&LiberationPrinciple::PowerBuilding]
        );
    }

    #[test]
    fn test_overall_score_stays_in_unit_interval() {
        let scorer = scorer();
        for scores in [0.0, 0.3, 0.7, 1.0] {
            for creator in [0.0, 0.5, 1.0] {
                let result = scorer
                    .score(&operation(
                        "community-led cooperative mutual aid creator-owned accessible fair pay",
                        creator,
                        scores,
                    ))
                    .unwrap();
                assert!((0.0..=1.0).contains(&result.score));
                for score in result.principle_scores.values() {
                    assert!((0.0..=1.0).contains(score));
                }
            }
        }
    }

    #[test]
    fn test_missing_liberation_impact_is_validation_error() {
        let op = OperationDescriptor::new("No impact").with_economic_impact(split(0.8));
        match scorer().score(&op) {
            Err(GovernanceError::Validation(e)) => {
                assert_eq!(e.field, "operation.liberation_impact")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_score_without_economics_uses_base_scores() {
        let result =
            scorer().score_impact("Adopt a new standard", &LiberationImpact::uniform(0.65), None);
        for score in result.principle_scores.values() {
            assert!((score - 0.65).abs() < 1e-9);
        }
        assert!(!result.valid);
        assert!(result.failed_principles.is_empty());
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("across all principles")));
    }

    #[test]
    fn test_reported_score_drift_noted() {
        let impact = LiberationImpact {
            overall_score: 0.2,
            ..LiberationImpact::uniform(0.9)
        };
        let result = scorer().score_impact("Plain text", &impact, None);
        assert!(result.feedback.iter().any(|f| f.contains("differs from the computed")));
    }

    #[test]
    fn test_determinism() {
        let scorer = scorer();
        let op = operation("A cooperative mutual aid drive", 0.76, 0.72);
        assert_eq!(scorer.score(&op).unwrap(), scorer.score(&op).unwrap());
    }
}
