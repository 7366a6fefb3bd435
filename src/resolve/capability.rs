use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::entity::{Entity, TaskId};
use crate::report;
use crate::resolve::{fan_out, ResolveStrategy};
use crate::storage::{KnowledgeStore, Query};

/// Taxonomy every capability query is scoped to by default.
pub const DEFAULT_TAXONOMY: &str = "ibm-ai-capabilities";

/// What a single task resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Capabilities required by the task, in store order.
    Found(Vec<Entity>),
    /// The query succeeded but no capability is mapped to the task.
    NoMappings,
    /// The store query for this task failed.
    Failed(String),
}

/// One task and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCapabilities {
    /// Task name as given.
    pub task: String,
    /// Normalized lookup id.
    pub task_id: TaskId,
    /// What the task's query produced.
    pub outcome: TaskOutcome,
}

/// Result of resolving a batch of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityResolution {
    /// Per-task outcomes, in input order.
    pub outcomes: Vec<TaskCapabilities>,
    /// Union of every capability id found. Iteration order carries no meaning.
    pub capability_ids: BTreeSet<String>,
}

impl CapabilityResolution {
    /// True when no tasks were supplied.
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Tasks whose query failed, with the failure message.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|t| match &t.outcome {
            TaskOutcome::Failed(msg) => Some((t.task.as_str(), msg.as_str())),
            _ => None,
        })
    }

    /// Textual report with the default description limit.
    #[must_use]
    pub fn report(&self) -> String {
        report::capabilities(self, report::CAPABILITY_DESCRIPTION_LIMIT)
    }
}

/// Maps task names to the capabilities they require.
#[derive(Clone)]
pub struct CapabilityResolver {
    store: Arc<dyn KnowledgeStore>,
    taxonomy: String,
    strategy: ResolveStrategy,
}

impl CapabilityResolver {
    /// Resolver over `store` using [`DEFAULT_TAXONOMY`], sequentially.
    #[must_use]
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            taxonomy: DEFAULT_TAXONOMY.to_string(),
            strategy: ResolveStrategy::Sequential,
        }
    }

    /// Scope queries to another taxonomy.
    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
        self.taxonomy = taxonomy.into();
        self
    }

    /// Select how tasks are scheduled.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ResolveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The taxonomy queries are scoped to.
    #[must_use]
    pub fn taxonomy(&self) -> &str {
        &self.taxonomy
    }

    /// Resolves every task; a failure for one task never aborts the others.
    #[must_use]
    pub fn resolve<S: AsRef<str> + Sync>(&self, tasks: &[S]) -> CapabilityResolution {
        if tasks.is_empty() {
            return CapabilityResolution::default();
        }

        let outcomes = fan_out(tasks, self.strategy, |task| self.resolve_task(task.as_ref()));

        let capability_ids = outcomes
            .iter()
            .filter_map(|t| match &t.outcome {
                TaskOutcome::Found(caps) => Some(caps),
                _ => None,
            })
            .flatten()
            .map(|cap| cap.id.clone())
            .collect::<BTreeSet<_>>();

        tracing::debug!(
            tasks = tasks.len(),
            capabilities = capability_ids.len(),
            "resolved task capabilities"
        );

        CapabilityResolution {
            outcomes,
            capability_ids,
        }
    }

    /// Resolves one task.
    #[must_use]
    pub fn resolve_task(&self, task: &str) -> TaskCapabilities {
        let task_id = TaskId::from_name(task);
        let query = Query::capabilities_for_task(task_id.as_str(), &self.taxonomy);

        let outcome = match self.store.query(&query) {
            Ok(caps) if caps.is_empty() => TaskOutcome::NoMappings,
            Ok(caps) => {
                tracing::debug!(task, %task_id, found = caps.len(), "capabilities for task");
                TaskOutcome::Found(caps)
            }
            Err(e) => {
                tracing::warn!(task, %task_id, error = %e, "capability query failed");
                TaskOutcome::Failed(e.to_string())
            }
        };

        TaskCapabilities {
            task: task.to_string(),
            task_id,
            outcome,
        }
    }
}

impl std::fmt::Debug for CapabilityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityResolver")
            .field("taxonomy", &self.taxonomy)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
