//! Governance Charter for the community platform
//!
//! This crate holds everything the governance decision engine decides *from*:
//!
//! - **Descriptors**: operations, creator actions, community data access,
//!   content and community proposals as submitted by callers
//! - **Liberation principles**: the five weighted policy dimensions with
//!   their indicator vocabularies and remediation text
//! - **Governance rules**: every weight, minimum and threshold in one
//!   validated, fingerprinted configuration struct
//! - **Rule sources**: where the current rules come from
//!
//! # Example
//!
//! ```ignore
//! use charter::{GovernanceRules, RuleSource, YamlFileRuleSource};
//!
//! let source = YamlFileRuleSource::new("/etc/platform/governance.yaml");
//! let rules = source.load().await?;
//! rules.validate()?;
//! tracing::info!(fingerprint = %rules.fingerprint(), "Rules ready");
//! ```

pub mod principles;
pub mod rules;
pub mod source;
pub mod types;

// Re-export main types
pub use principles::LiberationPrinciple;
pub use rules::*;
pub use source::{RuleSource, RuleSourceError, StaticRuleSource, YamlFileRuleSource};
pub use types::*;
