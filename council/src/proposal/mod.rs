//! Community proposals: validation, voting rules, eligibility and tallying.
//!
//! - **Governor**: validates a proposal's form and liberation compliance and
//!   computes the voting rules it will be decided under
//! - **Registry**: the external member registry that supplies the voter roll
//! - **Tally**: counts ballots against the computed rules

mod governor;
mod registry;
mod tally;

pub use governor::ProposalGovernor;
pub use registry::{MemberRegistry, StaticMemberRegistry};
pub use tally::tally;
