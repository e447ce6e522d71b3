//! The five liberation principles.
//!
//! Each principle carries the vocabulary the policy scorer looks for in an
//! operation description and the remediation text emitted when an operation
//! falls short on it. Weights live in [`crate::rules::PrincipleWeights`].

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A weighted policy dimension operations are scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum LiberationPrinciple {
    CreatorEmpowerment,
    CommunityLiberation,
    OppressionResistance,
    PowerBuilding,
    MutualAid,
}

impl LiberationPrinciple {
    /// All principles in scoring order.
    pub fn all() -> [Self; 5] {
        [
            Self::CreatorEmpowerment,
            Self::CommunityLiberation,
            Self::OppressionResistance,
            Self::PowerBuilding,
            Self::MutualAid,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatorEmpowerment => "creator_empowerment",
            Self::CommunityLiberation => "community_liberation",
            Self::OppressionResistance => "oppression_resistance",
            Self::PowerBuilding => "power_building",
            Self::MutualAid => "mutual_aid",
        }
    }

    /// Human-readable name for feedback lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreatorEmpowerment => "Creator empowerment",
            Self::CommunityLiberation => "Community liberation",
            Self::OppressionResistance => "Oppression resistance",
            Self::PowerBuilding => "Power building",
            Self::MutualAid => "Mutual aid",
        }
    }

    /// Phrases in a description that signal alignment with this principle.
    pub fn indicators(&self) -> &'static [&'static str] {
        match self {
            Self::CreatorEmpowerment => &[
                "creator-owned",
                "creator owned",
                "creator control",
                "fair pay",
                "revenue share",
                "ownership",
            ],
            Self::CommunityLiberation => &[
                "community-led",
                "community led",
                "community control",
                "self-determination",
                "collective",
                "grassroots",
            ],
            Self::OppressionResistance => &[
                "anti-racist",
                "accessibility",
                "accessible",
                "harm reduction",
                "anti-oppression",
                "inclusive",
            ],
            Self::PowerBuilding => &[
                "organizing",
                "cooperative",
                "co-op",
                "democratic",
                "solidarity",
                "coalition",
            ],
            Self::MutualAid => &[
                "mutual aid",
                "mutual-aid",
                "resource sharing",
                "free access",
                "sliding scale",
                "community fund",
            ],
        }
    }

    /// Phrases that signal the operation works against this principle.
    pub fn counter_indicators(&self) -> &'static [&'static str] {
        match self {
            Self::CreatorEmpowerment => &[
                "exclusive rights",
                "rights transfer",
                "work for hire",
                "buyout",
            ],
            Self::CommunityLiberation => &[
                "gentrif",
                "displacement",
                "top-down",
            ],
            Self::OppressionResistance => &[
                "surveillance",
                "profiling",
                "tracking users",
            ],
            Self::PowerBuilding => &[
                "union busting",
                "centralize control",
                "shareholder value",
            ],
            Self::MutualAid => &[
                "paywall",
                "premium only",
                "extract",
            ],
        }
    }

    /// Canned remediation for an operation that failed this principle.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::CreatorEmpowerment => {
                "Increase creator revenue share to 75% minimum and confirm creators keep \
                 ownership of their work"
            }
            Self::CommunityLiberation => {
                "Give affected communities decision-making power over how the operation is run"
            }
            Self::OppressionResistance => {
                "Audit the operation for discriminatory impact and remove surveillance or \
                 profiling components"
            }
            Self::PowerBuilding => {
                "Route decisions through democratic community structures rather than \
                 platform administrators"
            }
            Self::MutualAid => {
                "Direct a portion of revenue to the community mutual-aid fund"
            }
        }
    }
}

/// Count how many phrases from `phrases` occur in `text` (already lowercased).
pub fn count_matches(text: &str, phrases: &[&str]) -> usize {
    phrases.iter().filter(|phrase| text.contains(*phrase)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_principles_in_order() {
        let all = LiberationPrinciple::all();
        assert_eq!(all[0], LiberationPrinciple::CreatorEmpowerment);
        assert_eq!(all[4], LiberationPrinciple::MutualAid);
    }

    #[test]
    fn test_empowerment_remediation_names_revenue_minimum() {
        assert!(LiberationPrinciple::CreatorEmpowerment
            .remediation()
            .contains("75% minimum"));
    }

    #[test]
    fn test_indicator_vocabulary_is_lowercase() {
        for principle in LiberationPrinciple::all() {
            for phrase in principle
                .indicators()
                .iter()
                .chain(principle.counter_indicators())
            {
                assert_eq!(*phrase, phrase.to_lowercase(), "{} in {}", phrase, principle.as_str());
            }
        }
    }

    #[test]
    fn test_count_matches() {
        let text = "a community-led mutual aid co-op";
        assert_eq!(count_matches(text, LiberationPrinciple::MutualAid.indicators()), 1);
        assert_eq!(count_matches(text, LiberationPrinciple::PowerBuilding.indicators()), 1);
        assert_eq!(count_matches(text, LiberationPrinciple::PowerBuilding.counter_indicators()), 0);
    }
}
