//! Consent sufficiency for community data access.

use std::sync::Arc;
use tracing::debug;

use charter::{CommunityDataDescriptor, DataConsent, GovernanceRules, SensitivityTier};

use crate::evaluators::Evaluator;
use crate::types::{ConsentValidation, Result};

/// Checks that a data operation holds the consent its sensitivity demands.
pub struct ConsentValidator {
    rules: Arc<GovernanceRules>,
}

impl ConsentValidator {
    pub fn new(rules: Arc<GovernanceRules>) -> Self {
        Self { rules }
    }

    /// Consent grants a data operation needs.
    pub fn required_consent(&self, data: &CommunityDataDescriptor) -> Vec<DataConsent> {
        let mut required = Vec::new();

        match data.sensitivity {
            SensitivityTier::Private => {
                required.push(DataConsent::ExplicitCreator);
                required.push(DataConsent::ExplicitCommunity);
            }
            SensitivityTier::Community => required.push(DataConsent::Community),
            SensitivityTier::Public => {}
        }

        if data.creator_ids.len() > 1 {
            required.push(DataConsent::MultiCreator);
        }

        let has_creator_level = required
            .iter()
            .any(|c| matches!(c, DataConsent::Creator | DataConsent::ExplicitCreator));
        if data.consent_required && !has_creator_level {
            required.push(DataConsent::Creator);
        }

        required
    }

    /// Validate one data operation.
    pub fn validate(&self, data: &CommunityDataDescriptor) -> ConsentValidation {
        let required_consent = self.required_consent(data);
        let obtained_consent = data.obtained_consent.clone();
        let missing_consent: Vec<DataConsent> = required_consent
            .iter()
            .filter(|c| !obtained_consent.contains(c))
            .copied()
            .collect();

        let consent_level = if required_consent.is_empty() {
            1.0
        } else {
            (required_consent.len() - missing_consent.len()) as f64
                / required_consent.len() as f64
        };
        let approved = consent_level >= self.rules.data_consent.min_consent_level
            && missing_consent.is_empty();

        let summary = if required_consent.is_empty() {
            format!(
                "No consent required for {} {} data",
                data.sensitivity.as_str(),
                data.data_type
            )
        } else if approved {
            format!(
                "All required consent obtained for {} {} data",
                data.sensitivity.as_str(),
                data.data_type
            )
        } else {
            let missing: Vec<&str> = missing_consent.iter().map(|c| c.as_str()).collect();
            format!(
                "Missing consent for {} {} data: {}",
                data.sensitivity.as_str(),
                data.data_type,
                missing.join(", ")
            )
        };

        debug!(
            data_type = %data.data_type,
            sensitivity = data.sensitivity.as_str(),
            consent_level = consent_level,
            approved = approved,
            "Community data consent validated"
        );

        ConsentValidation {
            approved,
            evaluated: true,
            consent_level,
            required_consent,
            obtained_consent,
            missing_consent,
            summary,
        }
    }
}

#[async_trait::async_trait]
impl Evaluator<CommunityDataDescriptor> for ConsentValidator {
    type Verdict = ConsentValidation;

    fn name(&self) -> &str {
        "consent_validator"
    }

    async fn evaluate(&self, data: &CommunityDataDescriptor) -> Result<ConsentValidation> {
        Ok(self.validate(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ConsentValidator {
        ConsentValidator::new(Arc::new(GovernanceRules::default()))
    }

    fn data(sensitivity: SensitivityTier, creators: &[&str]) -> CommunityDataDescriptor {
        CommunityDataDescriptor {
            data_type: "oral_histories".to_string(),
            sensitivity,
            creator_ids: creators.iter().map(|c| c.to_string()).collect(),
            community_ids: vec!["community-1".to_string()],
            consent_required: false,
            obtained_consent: vec![],
        }
    }

    #[test]
    fn test_public_data_needs_nothing() {
        let result = validator().validate(&data(SensitivityTier::Public, &["c1"]));
        assert!(result.approved);
        assert_eq!(result.consent_level, 1.0);
        assert!(result.required_consent.is_empty());
        assert!(result.summary.contains("No consent required"));
    }

    #[test]
    fn test_private_data_needs_explicit_consent() {
        let validator = validator();
        let mut request = data(SensitivityTier::Private, &["c1"]);
        request.obtained_consent = vec![DataConsent::ExplicitCreator];

        let result = validator.validate(&request);
        assert!(!result.approved);
        assert_eq!(result.consent_level, 0.5);
        assert_eq!(result.missing_consent, vec![DataConsent::ExplicitCommunity]);
        assert!(result.summary.contains("explicit_community"));

        request.obtained_consent.push(DataConsent::ExplicitCommunity);
        assert!(validator.validate(&request).approved);
    }

    #[test]
    fn test_multiple_creators_need_joint_consent() {
        let mut request = data(SensitivityTier::Community, &["c1", "c2"]);
        request.consent_required = true;

        let required = validator().required_consent(&request);
        assert_eq!(
            required,
            vec![DataConsent::Community, DataConsent::MultiCreator, DataConsent::Creator]
        );
    }

    #[test]
    fn test_creator_consent_not_doubled_for_private_data() {
        let mut request = data(SensitivityTier::Private, &["c1"]);
        request.consent_required = true;

        let required = validator().required_consent(&request);
        assert!(!required.contains(&DataConsent::Creator));
    }

    #[test]
    fn test_any_missing_consent_rejects() {
        // half clears a lowered level, but any gap still rejects
        let mut rules = GovernanceRules::default();
        rules.data_consent.min_consent_level = 0.5;
        let validator = ConsentValidator::new(Arc::new(rules));

        let mut request = data(SensitivityTier::Community, &["c1", "c2"]);
        request.obtained_consent = vec![DataConsent::Community];

        let result = validator.validate(&request);
        assert_eq!(result.consent_level, 0.5);
        assert!(!result.approved);
    }
}
