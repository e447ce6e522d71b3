//! Decision store collaborator.
//!
//! Decisions are immutable once made; persisting them is the caller's
//! concern. The engine forwards decisions to a store only through
//! `decide_and_record`.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::{CollaboratorError, GovernanceDecision};

/// Persists governance decisions.
#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Name of the store.
    fn name(&self) -> &str;

    /// Record one decision.
    async fn record(&self, decision: &GovernanceDecision) -> Result<(), CollaboratorError>;
}

/// In-memory decision store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDecisionStore {
    decisions: Arc<RwLock<Vec<GovernanceDecision>>>,
}

impl InMemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded decisions, oldest first.
    pub async fn decisions(&self) -> Vec<GovernanceDecision> {
        self.decisions.read().await.clone()
    }

    /// Find a decision by ID.
    pub async fn get(&self, decision_id: &str) -> Option<GovernanceDecision> {
        self.decisions
            .read()
            .await
            .iter()
            .find(|d| d.decision_id == decision_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.decisions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.decisions.read().await.is_empty()
    }
}

#[async_trait]
impl DecisionStore for InMemoryDecisionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn record(&self, decision: &GovernanceDecision) -> Result<(), CollaboratorError> {
        let mut decisions = self.decisions.write().await;
        if decisions.iter().any(|d| d.decision_id == decision.decision_id) {
            return Err(CollaboratorError::Store(format!(
                "Decision {} already recorded",
                decision.decision_id
            )));
        }
        decisions.push(decision.clone());
        Ok(())
    }
}
