//! Creator sovereignty assessment.
//!
//! A creator action is approved only when three things hold at once: the
//! creator keeps the minimum revenue share, keeps narrative control over
//! the work, and has given current, informed consent covering every scope
//! the action touches.

use chrono::Duration;
use std::sync::Arc;
use tracing::debug;

use charter::{
    clamp_fraction, ConsentScope, ConsentStatus, ContentImpact, CreatorActionDescriptor,
    GovernanceRules, NarrativeControl, ValidationError,
};

use crate::clock::Clock;
use crate::evaluators::Evaluator;
use crate::types::{ConsentCondition, Result, SovereigntyDecision};

/// Assesses creator actions against the sovereignty minimums.
pub struct SovereigntyAssessor {
    rules: Arc<GovernanceRules>,
    clock: Arc<dyn Clock>,
}

impl SovereigntyAssessor {
    pub fn new(rules: Arc<GovernanceRules>, clock: Arc<dyn Clock>) -> Self {
        Self { rules, clock }
    }

    /// Assess one creator action.
    pub fn assess(&self, action: &CreatorActionDescriptor) -> Result<SovereigntyDecision> {
        let sovereignty = &self.rules.sovereignty;

        let economics = action
            .economic_impact
            .as_ref()
            .ok_or_else(|| ValidationError::missing("creator_action.economic_impact"))?
            .normalized("creator_action.economic_impact")?;
        let content = action
            .content_impact
            .normalized("creator_action.content_impact")?;
        let authenticity = clamp_fraction(
            "creator_action.narrative_control.cultural_authenticity",
            action.narrative_control.cultural_authenticity,
        )?;

        let actual_revenue_share = economics.creator_revenue_share;
        let revenue_share_compliant = actual_revenue_share >= sovereignty.min_creator_revenue_share;

        // the weaker of the structural score and the creator's own rating
        let structural_score =
            self.narrative_score(&action.creator_id, &action.narrative_control, authenticity);
        let narrative_control_score = structural_score.min(content.narrative_control);
        let narrative_control_maintained =
            narrative_control_score >= sovereignty.min_narrative_control;

        let required_consent = self.required_scopes(
            actual_revenue_share,
            &content,
            action.narrative_control.creator_ownership,
        );
        let missing_consent: Vec<ConsentScope> = required_consent
            .iter()
            .filter(|scope| !action.consent_status.scope.contains(scope))
            .copied()
            .collect();
        let failed_conditions = self.failed_conditions(&action.consent_status);

        let total_required = required_consent.len() + ConsentCondition::all().len();
        let total_missing = missing_consent.len() + failed_conditions.len();
        let consent_score = (total_required - total_missing) as f64 / total_required as f64;
        let creator_consent_obtained = consent_score >= sovereignty.min_consent_score
            && missing_consent.is_empty()
            && failed_conditions.is_empty();

        let approved =
            revenue_share_compliant && narrative_control_maintained && creator_consent_obtained;

        let mut required_actions = Vec::new();
        if !revenue_share_compliant {
            push_unique(
                &mut required_actions,
                format!(
                    "Increase creator revenue share to at least {:.0}% (currently {:.1}%)",
                    sovereignty.min_creator_revenue_share * 100.0,
                    actual_revenue_share * 100.0
                ),
            );
        }
        if !narrative_control_maintained {
            push_unique(
                &mut required_actions,
                format!(
                    "Restore creator narrative control to at least {:.2} (currently {:.2})",
                    sovereignty.min_narrative_control, narrative_control_score
                ),
            );
            if content.narrative_control < sovereignty.min_narrative_control {
                push_unique(
                    &mut required_actions,
                    format!(
                        "Address the creator's reported narrative control of {:.2}",
                        content.narrative_control
                    ),
                );
            }
            let narrative = &action.narrative_control;
            if !narrative.creator_ownership {
                push_unique(
                    &mut required_actions,
                    "Return ownership of the work to the creator".to_string(),
                );
            }
            if !narrative.distribution_control {
                push_unique(
                    &mut required_actions,
                    "Give the creator control over distribution".to_string(),
                );
            }
            if editing_retention(&action.creator_id, &narrative.editing_rights) < 1.0 {
                push_unique(
                    &mut required_actions,
                    "Return editing rights to the creator".to_string(),
                );
            }
        }
        if !creator_consent_obtained {
            if !missing_consent.is_empty() {
                let scopes: Vec<&str> = missing_consent.iter().map(|s| s.as_str()).collect();
                push_unique(
                    &mut required_actions,
                    format!("Obtain creator consent for: {}", scopes.join(", ")),
                );
            }
            for condition in &failed_conditions {
                push_unique(&mut required_actions, self.condition_remediation(*condition));
            }
        }

        let summary = if approved {
            format!("Creator sovereignty maintained for {}", action.creator_id)
        } else {
            let mut failing = Vec::new();
            if !revenue_share_compliant {
                failing.push("revenue share");
            }
            if !narrative_control_maintained {
                failing.push("narrative control");
            }
            if !creator_consent_obtained {
                failing.push("creator consent");
            }
            format!(
                "Creator sovereignty not maintained for {}: {}",
                action.creator_id,
                failing.join(", ")
            )
        };

        debug!(
            creator_id = %action.creator_id,
            approved = approved,
            revenue_share = actual_revenue_share,
            narrative_control = narrative_control_score,
            consent_score = consent_score,
            "Creator sovereignty assessed"
        );

        Ok(SovereigntyDecision {
            approved,
            evaluated: true,
            revenue_share_compliant,
            narrative_control_maintained,
            creator_consent_obtained,
            actual_revenue_share,
            narrative_control_score,
            consent_score,
            required_consent,
            missing_consent,
            failed_conditions,
            required_actions,
            summary,
        })
    }

    fn narrative_score(
        &self,
        creator_id: &str,
        narrative: &NarrativeControl,
        authenticity: f64,
    ) -> f64 {
        let weights = &self.rules.sovereignty.narrative_weights;
        let score = weights.ownership * flag(narrative.creator_ownership)
            + weights.distribution_control * flag(narrative.distribution_control)
            + weights.editing_rights * editing_retention(creator_id, &narrative.editing_rights)
            + weights.cultural_authenticity * authenticity;
        score.clamp(0.0, 1.0)
    }

    fn required_scopes(
        &self,
        revenue_share: f64,
        content: &ContentImpact,
        creator_ownership: bool,
    ) -> Vec<ConsentScope> {
        let unlock = self.rules.sovereignty.scope_unlock_threshold;
        let mut scopes = ConsentScope::base();

        if revenue_share > 0.0 {
            scopes.push(ConsentScope::RevenueSharing);
            scopes.push(ConsentScope::FinancialReporting);
        }
        if content.cultural_significance >= unlock {
            scopes.push(ConsentScope::CulturalContext);
        }
        if content.liberation_messaging >= unlock {
            scopes.push(ConsentScope::MovementAssociation);
        }
        if creator_ownership {
            scopes.push(ConsentScope::OwnershipRights);
        }
        scopes
    }

    fn failed_conditions(&self, status: &ConsentStatus) -> Vec<ConsentCondition> {
        ConsentCondition::all()
            .into_iter()
            .filter(|condition| match condition {
                ConsentCondition::Explicit => !status.explicit,
                ConsentCondition::Informed => !status.informed,
                ConsentCondition::Withdrawable => !status.withdrawable,
                ConsentCondition::Current => !self.is_current(status),
            })
            .collect()
    }

    /// One-off consent never lapses; continuing consent lapses after the
    /// validity window and is lapsed outright when it carries no date.
    fn is_current(&self, status: &ConsentStatus) -> bool {
        if !status.ongoing {
            return true;
        }
        let validity = Duration::days(i64::from(self.rules.sovereignty.consent_validity_days));
        match status.consent_date {
            Some(given) => self.clock.now() - given <= validity,
            None => false,
        }
    }

    fn condition_remediation(&self, condition: ConsentCondition) -> String {
        match condition {
            ConsentCondition::Explicit => "Obtain explicit consent from the creator".to_string(),
            ConsentCondition::Informed => {
                "Inform the creator how their work will be used before asking for consent"
                    .to_string()
            }
            ConsentCondition::Withdrawable => {
                "Make the creator's consent withdrawable at any time".to_string()
            }
            ConsentCondition::Current => format!(
                "Renew the creator's consent (continuing consent lapses after {} days)",
                self.rules.sovereignty.consent_validity_days
            ),
        }
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// 1.0 when the creator is the only editor, 0.5 when editing is shared,
/// 0.0 when the creator holds no editing rights.
fn editing_retention(creator_id: &str, editors: &[String]) -> f64 {
    if !editors.iter().any(|e| e == creator_id) {
        0.0
    } else if editors.iter().all(|e| e == creator_id) {
        1.0
    } else {
        0.5
    }
}

fn push_unique(actions: &mut Vec<String>, action: String) {
    if !actions.contains(&action) {
        actions.push(action);
    }
}

#[async_trait::async_trait]
impl Evaluator<CreatorActionDescriptor> for SovereigntyAssessor {
    type Verdict = SovereigntyDecision;

    fn name(&self) -> &str {
        "sovereignty_assessor"
    }

    async fn evaluate(&self, action: &CreatorActionDescriptor) -> Result<SovereigntyDecision> {
        self.assess(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::types::GovernanceError;
    use charter::EconomicImpact;
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn assessor() -> SovereigntyAssessor {
        SovereigntyAssessor::new(
            Arc::new(GovernanceRules::default()),
            Arc::new(FixedClock::new(now())),
        )
    }

    fn split(creator: f64) -> EconomicImpact {
        let rest = 1.0 - creator;
        EconomicImpact {
            creator_revenue_share: creator,
            community_share: rest * 0.6,
            platform_share: rest * 0.2,
            mutual_aid_fund: rest * 0.1,
            liberation_investment: rest * 0.1,
        }
    }

    fn full_consent() -> ConsentStatus {
        ConsentStatus {
            explicit: true,
            informed: true,
            ongoing: true,
            withdrawable: true,
            consent_date: Some(now() - Duration::days(30)),
            scope: vec![
                ConsentScope::ContentUsage,
                ConsentScope::Attribution,
                ConsentScope::Distribution,
                ConsentScope::Modification,
                ConsentScope::RevenueSharing,
                ConsentScope::FinancialReporting,
                ConsentScope::OwnershipRights,
            ],
        }
    }

    fn action(creator_share: f64) -> CreatorActionDescriptor {
        CreatorActionDescriptor {
            creator_id: "creator-1".to_string(),
            content_impact: ContentImpact {
                narrative_control: 0.9,
                cultural_significance: 0.2,
                community_resonance: 0.6,
                liberation_messaging: 0.3,
            },
            economic_impact: Some(split(creator_share)),
            narrative_control: NarrativeControl {
                creator_ownership: true,
                editing_rights: vec!["creator-1".to_string()],
                distribution_control: true,
                cultural_authenticity: 0.9,
            },
            consent_status: full_consent(),
        }
    }

    #[test]
    fn test_sovereign_action_is_approved() {
        let decision = assessor().assess(&action(0.8)).unwrap();

        assert!(decision.approved);
        assert!(decision.evaluated);
        assert!(decision.revenue_share_compliant);
        assert!(decision.narrative_control_maintained);
        assert!(decision.creator_consent_obtained);
        assert_eq!(decision.consent_score, 1.0);
        assert!(decision.required_actions.is_empty());
        assert!(decision.summary.contains("maintained"));
    }

    #[test]
    fn test_revenue_share_boundary_is_inclusive() {
        let assessor = assessor();
        assert!(assessor.assess(&action(0.75)).unwrap().revenue_share_compliant);
        assert!(!assessor.assess(&action(0.7499)).unwrap().revenue_share_compliant);
    }

    #[test]
    fn test_low_revenue_share_gets_remediation() {
        let decision = assessor().assess(&action(0.6)).unwrap();

        assert!(!decision.approved);
        assert!(!decision.revenue_share_compliant);
        assert_eq!(
            decision.required_actions,
            vec!["Increase creator revenue share to at least 75% (currently 60.0%)".to_string()]
        );
    }

    #[test]
    fn test_narrative_score_components() {
        let assessor = assessor();

        let mut shared = action(0.8);
        shared.narrative_control.editing_rights.push("editor-9".to_string());
        let decision = assessor.assess(&shared).unwrap();
        // 0.35 + 0.25 + 0.15 * 0.5 + 0.25 * 0.9
        assert!((decision.narrative_control_score - 0.9).abs() < 1e-9);

        let mut lost = action(0.8);
        lost.narrative_control.creator_ownership = false;
        lost.narrative_control.editing_rights.clear();
        lost.consent_status.scope.retain(|s| *s != ConsentScope::OwnershipRights);
        let decision = assessor.assess(&lost).unwrap();
        assert!(!decision.narrative_control_maintained);
        assert!(decision
            .required_actions
            .contains(&"Return ownership of the work to the creator".to_string()));
        assert!(decision
            .required_actions
            .contains(&"Return editing rights to the creator".to_string()));
    }

    #[test]
    fn test_reported_narrative_control_is_a_minimum() {
        let mut action = action(0.8);
        action.content_impact.narrative_control = 0.05;

        let decision = assessor().assess(&action).unwrap();
        assert!(!decision.narrative_control_maintained);
        assert!(!decision.approved);
        assert!((decision.narrative_control_score - 0.05).abs() < 1e-9);
        assert!(decision
            .required_actions
            .contains(&"Address the creator's reported narrative control of 0.05".to_string()));
        assert!(!decision
            .required_actions
            .contains(&"Return ownership of the work to the creator".to_string()));
    }

    #[test]
    fn test_extra_scopes_are_required() {
        let mut cultural = action(0.8);
        cultural.content_impact.cultural_significance = 0.5;
        cultural.content_impact.liberation_messaging = 0.7;

        let decision = assessor().assess(&cultural).unwrap();
        assert!(decision.required_consent.contains(&ConsentScope::CulturalContext));
        assert!(decision.required_consent.contains(&ConsentScope::MovementAssociation));
        assert_eq!(
            decision.missing_consent,
            vec![ConsentScope::CulturalContext, ConsentScope::MovementAssociation]
        );
        assert!(!decision.creator_consent_obtained);
        assert!(decision
            .required_actions
            .iter()
            .any(|a| a == "Obtain creator consent for: cultural_context, movement_association"));
    }

    #[test]
    fn test_no_revenue_means_no_revenue_scopes() {
        let decision = assessor().assess(&action(0.0)).unwrap();
        assert!(!decision.required_consent.contains(&ConsentScope::RevenueSharing));
        assert!(!decision.required_consent.contains(&ConsentScope::FinancialReporting));
    }

    #[test]
    fn test_stale_continuing_consent_fails() {
        let assessor = assessor();

        let mut stale = action(0.8);
        stale.consent_status.consent_date = Some(now() - Duration::days(366));
        let decision = assessor.assess(&stale).unwrap();
        assert_eq!(decision.failed_conditions, vec![ConsentCondition::Current]);
        assert!(!decision.creator_consent_obtained);

        let mut undated = action(0.8);
        undated.consent_status.consent_date = None;
        let decision = assessor.assess(&undated).unwrap();
        assert_eq!(decision.failed_conditions, vec![ConsentCondition::Current]);

        let mut one_off = action(0.8);
        one_off.consent_status.ongoing = false;
        one_off.consent_status.consent_date = None;
        assert!(assessor.assess(&one_off).unwrap().creator_consent_obtained);
    }

    #[test]
    fn test_consent_score_counts_conditions() {
        let mut uninformed = action(0.8);
        uninformed.consent_status.informed = false;

        let decision = assessor().assess(&uninformed).unwrap();
        // 7 scopes + 4 conditions required, 1 missing
        assert!((decision.consent_score - 10.0 / 11.0).abs() < 1e-9);
        assert!(!decision.creator_consent_obtained);
    }

    #[test]
    fn test_missing_economic_impact_is_validation_error() {
        let mut bare = action(0.8);
        bare.economic_impact = None;
        assert!(matches!(
            assessor().assess(&bare),
            Err(GovernanceError::Validation(_))
        ));
    }

    #[test]
    fn test_required_actions_are_deduplicated() {
        let mut bad = action(0.1);
        bad.narrative_control = NarrativeControl::default();
        bad.consent_status = ConsentStatus::default();

        let decision = assessor().assess(&bad).unwrap();
        let mut unique = decision.required_actions.clone();
        unique.dedup();
        assert_eq!(unique, decision.required_actions);
        assert!(decision.summary.contains("revenue share, narrative control, creator consent"));
    }
}
