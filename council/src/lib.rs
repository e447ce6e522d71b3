//! Council - the governance decision engine
//!
//! Decides whether proposed platform actions comply with the community's
//! governance principles:
//!
//! - **Policy scoring**: weighted liberation principles with remediation
//! - **Creator sovereignty**: revenue share, narrative control and consent
//! - **Data consent**: consent sufficiency by sensitivity tier
//! - **Content safety**: harmful-pattern screening through a pluggable classifier
//! - **Democratic voting**: proposal validation, voting rules, eligibility, tally
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    GovernanceEngine                        │
//! │                                                            │
//! │  ┌──────────────────── DecisionAggregator ──────────────┐  │
//! │  │                                                      │  │
//! │  │  ┌────────┐ ┌─────────────┐ ┌─────────┐ ┌────────┐  │  │
//! │  │  │ Policy │ │ Sovereignty │ │ Consent │ │ Safety │  │  │
//! │  │  └────────┘ └─────────────┘ └─────────┘ └────┬───┘  │  │
//! │  │                                  Classifier ─┘      │  │
//! │  │  ┌──────────────────┐                               │  │
//! │  │  │ ProposalGovernor │── MemberRegistry              │  │
//! │  │  └──────────────────┘                               │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                       │                                    │
//! │                DecisionStore (decide_and_record)           │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules come from [`charter`]; time comes from an injected [`Clock`].

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod engine;
pub mod evaluators;
pub mod proposal;
pub mod store;
pub mod types;

// Re-export main types
pub use aggregator::DecisionAggregator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, GeneralConfig};
pub use engine::{GovernanceEngine, GovernanceEngineBuilder};
pub use evaluators::{
    CategorySignals, ConsentValidator, ContentClassifier, ContentSafetyDetector, Evaluator,
    KeywordClassifier, PolicyScorer, SovereigntyAssessor,
};
pub use proposal::{tally, MemberRegistry, ProposalGovernor, StaticMemberRegistry};
pub use store::{DecisionStore, InMemoryDecisionStore};
pub use types::*;
