//! Member registry collaborator.

use async_trait::async_trait;
use std::collections::BTreeMap;

use charter::CommunityProposal;

use crate::types::{CollaboratorError, SpecialRight, VoterRoll};

/// Resolves who may vote on a proposal.
///
/// Implementations typically front a membership service; the engine never
/// stores the roll.
#[async_trait]
pub trait MemberRegistry: Send + Sync {
    /// Name of the registry.
    fn name(&self) -> &str;

    /// Resolve the voter roll for a proposal.
    async fn resolve_eligible_voters(
        &self,
        proposal: &CommunityProposal,
    ) -> Result<VoterRoll, CollaboratorError>;
}

/// In-memory registry with a fixed roll.
#[derive(Debug, Clone, Default)]
pub struct StaticMemberRegistry {
    roll: VoterRoll,
}

impl StaticMemberRegistry {
    pub fn new<E, I, S>(eligible: E, ineligible: I) -> Self
    where
        E: IntoIterator<Item = S>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roll: VoterRoll {
                eligible: eligible.into_iter().map(Into::into).collect(),
                ineligible: ineligible.into_iter().map(Into::into).collect(),
                special_rights: BTreeMap::new(),
            },
        }
    }

    /// Grant a voter a special right.
    pub fn with_special_right(mut self, voter_id: impl Into<String>, right: SpecialRight) -> Self {
        self.roll
            .special_rights
            .entry(voter_id.into())
            .or_default()
            .push(right);
        self
    }
}

#[async_trait]
impl MemberRegistry for StaticMemberRegistry {
    fn name(&self) -> &str {
        "static"
    }

    async fn resolve_eligible_voters(
        &self,
        _proposal: &CommunityProposal,
    ) -> Result<VoterRoll, CollaboratorError> {
        Ok(self.roll.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter::ProposalType;
    use chrono::Utc;

    #[tokio::test]
    async fn test_static_registry_returns_roll() {
        let registry = StaticMemberRegistry::new(["m1", "m2"], ["m3"])
            .with_special_right("m1", SpecialRight::WeightedVote { weight: 2.0 })
            .with_special_right("m1", SpecialRight::Veto);

        let proposal = CommunityProposal::new(
            "Title here",
            "Description",
            ProposalType::PlatformChange,
            "m2",
            Utc::now(),
        );
        let roll = registry.resolve_eligible_voters(&proposal).await.unwrap();

        assert_eq!(roll.eligible, vec!["m1", "m2"]);
        assert_eq!(roll.ineligible, vec!["m3"]);
        assert_eq!(roll.special_rights["m1"].len(), 2);
    }

    #[tokio::test]
    async fn test_default_registry_is_empty() {
        let proposal = CommunityProposal::new(
            "Title here",
            "Description",
            ProposalType::PlatformChange,
            "m2",
            Utc::now(),
        );
        let roll = StaticMemberRegistry::default()
            .resolve_eligible_voters(&proposal)
            .await
            .unwrap();
        assert!(roll.eligible.is_empty());
    }
}
