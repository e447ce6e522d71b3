//! The leaf evaluators.
//!
//! - **Policy**: weighted liberation-principle scoring
//! - **Sovereignty**: revenue share, narrative control and creator consent
//! - **Consent**: consent sufficiency for community data access
//! - **Safety**: harmful-pattern detection through a pluggable classifier
//!
//! Every evaluator is a function of `(input, rules)` and is awaited the same
//! way whether or not it needs to suspend.

mod classifier;
mod consent;
mod policy;
mod safety;
mod sovereignty;

pub use classifier::{CategorySignals, ContentClassifier, KeywordClassifier};
pub use consent::ConsentValidator;
pub use policy::PolicyScorer;
pub use safety::ContentSafetyDetector;
pub use sovereignty::SovereigntyAssessor;

use crate::types::Result;

/// Common trait for evaluators.
#[async_trait::async_trait]
pub trait Evaluator<I: Sync>: Send + Sync {
    /// Verdict this evaluator produces.
    type Verdict: Send;

    /// Name of the evaluator.
    fn name(&self) -> &str;

    /// Evaluate one input.
    async fn evaluate(&self, input: &I) -> Result<Self::Verdict>;
}
