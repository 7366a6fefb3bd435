use std::sync::Arc;

use serde::Serialize;

use crate::entity::{Entity, EntityClass};
use crate::report;
use crate::resolve::{fan_out, ResolveStrategy};
use crate::storage::{KnowledgeStore, Query};

/// What a single capability resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum IntrinsicOutcome {
    /// Adapters implementing the capability, in store order.
    Found(Vec<Entity>),
    /// The capability exists but nothing implements it.
    NoneFound,
    /// A store call for this capability failed.
    Failed(String),
}

/// One capability and the intrinsics implementing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityIntrinsics {
    /// The capability id as supplied.
    pub capability_id: String,
    /// The resolved capability; `None` only when the lookup itself failed.
    pub capability: Option<Entity>,
    /// What the adapter query produced.
    pub outcome: IntrinsicOutcome,
}

impl CapabilityIntrinsics {
    /// Display name of the capability, falling back to its id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.capability
            .as_ref()
            .map_or(self.capability_id.as_str(), |c| c.name.as_str())
    }
}

/// Result of resolving a batch of capability ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntrinsicResolution {
    /// Number of capability ids supplied.
    pub requested: usize,
    /// Per-capability groups, in input order. Stale ids are absent.
    pub outcomes: Vec<CapabilityIntrinsics>,
    /// Every intrinsic encountered, across all capabilities. Not deduplicated:
    /// an adapter implementing two capabilities appears twice.
    pub intrinsics: Vec<Entity>,
}

impl IntrinsicResolution {
    /// True when no capability ids were supplied.
    #[must_use]
    pub const fn is_empty_input(&self) -> bool {
        self.requested == 0
    }

    /// Number of supplied ids that no longer resolve to a capability.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.requested - self.outcomes.len()
    }

    /// Textual report with the default description limit.
    #[must_use]
    pub fn report(&self) -> String {
        report::intrinsics(self, report::INTRINSIC_DESCRIPTION_LIMIT)
    }
}

/// Maps capability ids to the adapters (intrinsics) implementing them.
#[derive(Clone)]
pub struct IntrinsicResolver {
    store: Arc<dyn KnowledgeStore>,
    strategy: ResolveStrategy,
}

impl IntrinsicResolver {
    /// Sequential resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            strategy: ResolveStrategy::Sequential,
        }
    }

    /// Select how capabilities are scheduled.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ResolveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Resolves every capability id. Empty input never touches the store.
    #[must_use]
    pub fn resolve<I, S>(&self, capability_ids: I) -> IntrinsicResolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<String> = capability_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();
        if ids.is_empty() {
            return IntrinsicResolution::default();
        }

        let outcomes: Vec<CapabilityIntrinsics> =
            fan_out(&ids, self.strategy, |id| self.resolve_capability(id))
                .into_iter()
                .flatten()
                .collect();

        let intrinsics: Vec<Entity> = outcomes
            .iter()
            .filter_map(|c| match &c.outcome {
                IntrinsicOutcome::Found(adapters) => Some(adapters.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect();

        tracing::debug!(
            requested = ids.len(),
            resolved = outcomes.len(),
            intrinsics = intrinsics.len(),
            "resolved capability intrinsics"
        );

        IntrinsicResolution {
            requested: ids.len(),
            outcomes,
            intrinsics,
        }
    }

    /// Resolves one capability id; `None` when the id is stale.
    #[must_use]
    pub fn resolve_capability(&self, capability_id: &str) -> Option<CapabilityIntrinsics> {
        let capability = match self.store.get(&EntityClass::Capability, capability_id) {
            Ok(Some(cap)) => cap,
            Ok(None) => {
                tracing::debug!(capability_id, "skipping stale capability id");
                return None;
            }
            Err(e) => {
                tracing::warn!(capability_id, error = %e, "capability lookup failed");
                return Some(CapabilityIntrinsics {
                    capability_id: capability_id.to_string(),
                    capability: None,
                    outcome: IntrinsicOutcome::Failed(e.to_string()),
                });
            }
        };

        let outcome = match self.store.query(&Query::adapters_for_capability(capability_id)) {
            Ok(adapters) if adapters.is_empty() => IntrinsicOutcome::NoneFound,
            Ok(adapters) => IntrinsicOutcome::Found(adapters),
            Err(e) => {
                tracing::warn!(capability_id, error = %e, "adapter query failed");
                IntrinsicOutcome::Failed(e.to_string())
            }
        };

        Some(CapabilityIntrinsics {
            capability_id: capability_id.to_string(),
            capability: Some(capability),
            outcome,
        })
    }
}

impl std::fmt::Debug for IntrinsicResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntrinsicResolver")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
