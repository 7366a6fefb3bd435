//! The end-to-end navigator: intent → tasks → capabilities → intrinsics.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use capnav::{Entity, EntityClass, InMemoryKnowledgeStore, Navigator, TaskSource};
//!
//! let store = InMemoryKnowledgeStore::new();
//! store
//!     .insert(EntityClass::AiTask, Entity::new("summarization", "Summarization"))
//!     .unwrap();
//!
//! let navigator = Navigator::new(Arc::new(store));
//! let report = navigator.run("", TaskSource::AllTasks);
//! assert_eq!(report.tasks, vec!["Summarization"]);
//! assert!(report.tasks_report.contains("- Summarization"));
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::NavigatorConfig;
use crate::entity::{truncate_with_ellipsis, EntityClass};
use crate::error::IdentifyError;
use crate::identify::TaskIdentifier;
use crate::inference::InferenceEngine;
use crate::report;
use crate::resolve::{
    CapabilityResolution, CapabilityResolver, IntrinsicResolution, IntrinsicResolver,
};
use crate::storage::{KnowledgeStore, StoreError, IS_PART_OF};

/// Shown by [`Navigator::explore_task`] when the capability report is blank.
pub const NO_TASK_CAPABILITIES: &str = "*No capabilities found for this task*";

/// Shown by [`Navigator::explore_task`] when the intrinsic report is blank.
pub const NO_TASK_INTRINSICS: &str = "*No intrinsics found for the identified capabilities*";

/// Where the pipeline's task list comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    /// Ask the inference engine to identify tasks from the intent.
    #[default]
    Llm,
    /// Use every task in the store; the intent is ignored.
    AllTasks,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Unique id of this run, also recorded on the tracing span.
    pub run_id: Uuid,
    /// Where the task list came from.
    pub source: TaskSource,
    /// When the run began.
    pub started_at: DateTime<Utc>,
    /// When the run ended, including short-circuited runs.
    pub finished_at: DateTime<Utc>,
    /// Task names fed to capability resolution.
    pub tasks: Vec<String>,
    /// Task stage text, or the identification error message.
    pub tasks_report: String,
    /// Capability stage text; empty when the run stopped early.
    pub capabilities_report: String,
    /// Intrinsic stage text; empty when the run stopped early.
    pub intrinsics_report: String,
    /// Why identification produced no tasks, in LLM mode.
    #[serde(skip)]
    pub identify_error: Option<IdentifyError>,
    /// `None` when the run stopped before capability resolution.
    pub capabilities: Option<CapabilityResolution>,
    /// `None` when the run stopped before intrinsic resolution.
    pub intrinsics: Option<IntrinsicResolution>,
}

impl PipelineReport {
    /// True when the run stopped after the task stage.
    #[must_use]
    pub const fn short_circuited(&self) -> bool {
        self.capabilities.is_none()
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tasks_report.trim_end())?;
        if !self.capabilities_report.is_empty() {
            writeln!(f, "\n## Capabilities\n\n{}", self.capabilities_report.trim_end())?;
        }
        if !self.intrinsics_report.is_empty() {
            writeln!(f, "\n## Intrinsics\n\n{}", self.intrinsics_report.trim_end())?;
        }
        Ok(())
    }
}

/// Capabilities and intrinsics for one selected task.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorationReport {
    /// The explored task name.
    pub task: String,
    /// Capabilities required by the task.
    pub capabilities: CapabilityResolution,
    /// Intrinsics implementing those capabilities.
    pub intrinsics: IntrinsicResolution,
    /// Capability text, with a fallback line when blank.
    pub capabilities_report: String,
    /// Intrinsic text, with a fallback line when blank.
    pub intrinsics_report: String,
}

/// How much of the graph is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// Number of capability entities.
    pub capabilities: usize,
    /// Number of AI task entities.
    pub tasks: usize,
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loaded {} capabilities and {} AI tasks",
            self.capabilities, self.tasks
        )
    }
}

/// One line of the capability catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    /// Capability display name.
    pub name: String,
    /// Capability id.
    pub id: String,
    /// The `isPartOf` grouping, empty when absent.
    pub group: String,
    /// Truncated description, empty when absent.
    pub description: String,
}

/// Composes task identification, capability resolution and intrinsic
/// resolution over one knowledge store.
#[derive(Clone)]
pub struct Navigator {
    store: Arc<dyn KnowledgeStore>,
    identifier: TaskIdentifier,
    config: NavigatorConfig,
}

impl Navigator {
    /// Navigator over `store` with default settings and no engine.
    #[must_use]
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            store,
            identifier: TaskIdentifier::unconfigured(),
            config: NavigatorConfig::default(),
        }
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_config(mut self, config: NavigatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Install an inference engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn InferenceEngine>) -> Self {
        self.identifier.set_engine(engine);
        self
    }

    /// Replace the task identifier, e.g. one with a task catalog.
    #[must_use]
    pub fn with_identifier(mut self, identifier: TaskIdentifier) -> Self {
        self.identifier = identifier;
        self
    }

    /// Installs or replaces the inference engine after construction.
    pub fn set_engine(&mut self, engine: Arc<dyn InferenceEngine>) {
        tracing::info!(model = engine.model_name(), "inference engine configured");
        self.identifier.set_engine(engine);
    }

    /// Returns true once an inference engine is installed.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.identifier.is_configured()
    }

    /// Current settings.
    #[must_use]
    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    fn capability_resolver(&self) -> CapabilityResolver {
        CapabilityResolver::new(Arc::clone(&self.store))
            .with_taxonomy(self.config.taxonomy.clone())
            .with_strategy(self.config.strategy())
    }

    fn intrinsic_resolver(&self) -> IntrinsicResolver {
        IntrinsicResolver::new(Arc::clone(&self.store)).with_strategy(self.config.strategy())
    }

    /// Names of every task in the store, in store order.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn task_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .get_all(&EntityClass::AiTask)?
            .into_iter()
            .map(|task| task.name)
            .collect())
    }

    /// Runs the full pipeline.
    ///
    /// Never fails as a whole: identification problems and store failures
    /// end up in the report text, and per-item failures are recorded inline
    /// by each stage.
    pub fn run(&self, intent: &str, source: TaskSource) -> PipelineReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = tracing::info_span!("pipeline", %run_id, ?source);
        let _enter = span.enter();
        tracing::info!("pipeline started");

        let mut report = PipelineReport {
            run_id,
            source,
            started_at,
            finished_at: started_at,
            tasks: Vec::new(),
            tasks_report: String::new(),
            capabilities_report: String::new(),
            intrinsics_report: String::new(),
            identify_error: None,
            capabilities: None,
            intrinsics: None,
        };

        let tasks = match source {
            TaskSource::Llm => match self.identifier.identify(intent) {
                Ok(tasks) => {
                    report.tasks_report = report::identified_tasks(&tasks);
                    tasks
                }
                Err(e) => {
                    tracing::warn!(error = %e, "task identification produced no tasks");
                    report.tasks_report = e.to_string();
                    report.identify_error = Some(e);
                    Vec::new()
                }
            },
            TaskSource::AllTasks => match self.task_names() {
                Ok(tasks) => {
                    report.tasks_report = report::all_tasks(&tasks);
                    tasks
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not list tasks");
                    report.tasks_report = format!("*Error: {e}*");
                    return Self::finish(report);
                }
            },
        };

        if source == TaskSource::Llm && tasks.is_empty() {
            return Self::finish(report);
        }

        let capabilities = self.capability_resolver().resolve(&tasks);
        report.capabilities_report =
            report::capabilities(&capabilities, self.config.capability_description_limit);

        let intrinsics = self.intrinsic_resolver().resolve(&capabilities.capability_ids);
        report.intrinsics_report =
            report::intrinsics(&intrinsics, self.config.intrinsic_description_limit);

        report.tasks = tasks;
        report.capabilities = Some(capabilities);
        report.intrinsics = Some(intrinsics);
        Self::finish(report)
    }

    fn finish(mut report: PipelineReport) -> PipelineReport {
        report.finished_at = Utc::now();
        tracing::info!(
            tasks = report.tasks.len(),
            capabilities = report.capabilities.as_ref().map_or(0, |c| c.capability_ids.len()),
            intrinsics = report.intrinsics.as_ref().map_or(0, |i| i.intrinsics.len()),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "pipeline finished"
        );
        report
    }

    /// Capabilities and intrinsics for a single task.
    #[must_use]
    pub fn explore_task(&self, task: &str) -> ExplorationReport {
        let capabilities = self.capability_resolver().resolve(&[task]);
        let mut capabilities_report =
            report::capabilities(&capabilities, self.config.capability_description_limit);
        if capabilities_report.trim().is_empty() {
            capabilities_report = NO_TASK_CAPABILITIES.to_string();
        }

        let intrinsics = self.intrinsic_resolver().resolve(&capabilities.capability_ids);
        let mut intrinsics_report =
            report::intrinsics(&intrinsics, self.config.intrinsic_description_limit);
        if intrinsics_report.trim().is_empty() {
            intrinsics_report = NO_TASK_INTRINSICS.to_string();
        }

        ExplorationReport {
            task: task.to_string(),
            capabilities,
            intrinsics,
            capabilities_report,
            intrinsics_report,
        }
    }

    /// Counts of loaded capabilities and tasks.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn catalog_summary(&self) -> Result<CatalogSummary, StoreError> {
        Ok(CatalogSummary {
            capabilities: self.store.count(&EntityClass::Capability)?,
            tasks: self.store.count(&EntityClass::AiTask)?,
        })
    }

    /// Every capability, sorted by group. Order within a group is store
    /// order.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn capability_catalog(&self) -> Result<Vec<CatalogRow>, StoreError> {
        let limit = self.config.catalog_description_limit;
        let mut rows: Vec<CatalogRow> = self
            .store
            .get_all(&EntityClass::Capability)?
            .into_iter()
            .map(|cap| CatalogRow {
                group: cap
                    .attribute(IS_PART_OF)
                    .and_then(|v| v.first())
                    .unwrap_or_default()
                    .to_string(),
                description: cap
                    .description()
                    .map(|d| truncate_with_ellipsis(d, limit))
                    .unwrap_or_default(),
                name: cap.name,
                id: cap.id,
            })
            .collect();
        rows.sort_by(|a, b| a.group.cmp(&b.group));
        Ok(rows)
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("identifier", &self.identifier)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
