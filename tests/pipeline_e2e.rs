use capnav::storage::{IMPLEMENTS_CAPABILITY, IS_DEFINED_BY_TAXONOMY, REQUIRED_BY_TASK};
use capnav::{
    Conversation, Entity, EntityClass, InMemoryKnowledgeStore, InferenceEngine, InferenceError,
    KnowledgeStore, Navigator, NavigatorConfig, Prediction, Query, StoreError, TaskSource,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const GRAPH: &str = r#"{
  "aitasks": [
    {"id": "question-answering", "name": "Question Answering"},
    {"id": "summarization", "name": "Summarization"}
  ],
  "capabilities": [
    {"id": "c1", "name": "Reading Comprehension",
     "description": "Understand a passage well enough to answer questions about it",
     "isDefinedByTaxonomy": "ibm-ai-capabilities", "isPartOf": "language",
     "requiredByTask": ["question-answering", "summarization"]},
    {"id": "c2", "name": "Abstraction",
     "isDefinedByTaxonomy": "ibm-ai-capabilities", "isPartOf": "cognition",
     "requiredByTask": "summarization"},
    {"id": "c3", "name": "Other Taxonomy Capability",
     "isDefinedByTaxonomy": "somebody-else",
     "requiredByTask": "summarization"}
  ],
  "adapters": [
    {"id": "a1", "name": "Answerability", "implementsCapability": "c1"},
    {"id": "a2", "name": "Citation Generation", "implementsCapability": ["c1", "c2"]}
  ]
}"#;

fn navigator() -> Navigator {
    let store = InMemoryKnowledgeStore::from_json_str(GRAPH).unwrap();
    Navigator::new(Arc::new(store))
}

struct Reply(&'static str);

impl InferenceEngine for Reply {
    fn chat(&self, conversations: &[Conversation]) -> Result<Vec<Prediction>, InferenceError> {
        Ok(conversations.iter().map(|_| Prediction::text(self.0)).collect())
    }

    fn model_name(&self) -> &str {
        "reply"
    }
}

#[test]
fn exhaustive_run_over_json_graph() {
    let report = navigator().run("ignored", TaskSource::AllTasks);

    assert_eq!(report.tasks, vec!["Question Answering", "Summarization"]);
    let capabilities = report.capabilities.as_ref().unwrap();
    let ids: Vec<&str> = capabilities.capability_ids.iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert!(!report.capabilities_report.contains("Other Taxonomy Capability"));

    let intrinsics = report.intrinsics.as_ref().unwrap();
    let names: Vec<&str> = intrinsics.intrinsics.iter().map(|e| e.name.as_str()).collect();
    // a2 implements both capabilities and is listed under each.
    assert_eq!(
        names,
        vec!["Answerability", "Citation Generation", "Citation Generation"]
    );
    assert!(report
        .intrinsics_report
        .contains("**Reading Comprehension** (2 implementation(s))"));
}

#[test]
fn llm_run_with_markdown_answer() {
    let navigator = navigator().with_engine(Arc::new(Reply("1. **Summarization**\n")));
    let report = navigator.run("condense weekly status reports", TaskSource::Llm);

    assert_eq!(report.tasks_report, "### Identified AI Tasks:\n\n1. **Summarization**\n");
    assert!(report.capabilities_report.contains("- **Reading Comprehension** (`c1`)"));
    assert!(report.capabilities_report.contains("- **Abstraction** (`c2`)"));
}

#[test]
fn blank_intent_is_reported_not_raised() {
    let navigator = navigator().with_engine(Arc::new(Reply("[]")));
    let report = navigator.run("   ", TaskSource::Llm);
    assert_eq!(report.tasks_report, "Please enter a use case description.");
    assert!(report.capabilities.is_none());
}

#[test]
fn custom_taxonomy_and_parallel_workers() {
    let config = NavigatorConfig {
        taxonomy: "somebody-else".to_string(),
        resolve_workers: 4,
        ..NavigatorConfig::default()
    };
    let report = navigator().with_config(config).run("", TaskSource::AllTasks);
    let capabilities = report.capabilities.unwrap();
    assert_eq!(capabilities.capability_ids.len(), 1);
    assert!(capabilities.capability_ids.contains("c3"));
}

#[test]
fn unknown_task_is_explored_gracefully() {
    let exploration = navigator().explore_task("Translation");
    assert!(exploration.capabilities.capability_ids.is_empty());
    assert_eq!(exploration.capabilities_report, "*No capability mappings found*\n\n");
}

#[test]
fn graph_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(GRAPH.as_bytes())
        .unwrap();

    let store = InMemoryKnowledgeStore::from_path(&path).unwrap();
    assert_eq!(store.count(&EntityClass::Adapter).unwrap(), 2);
    let adapters = store.query(&Query::adapters_for_capability("c2")).unwrap();
    assert_eq!(adapters.len(), 1);
    assert_eq!(adapters[0].id, "a2");
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = InMemoryKnowledgeStore::from_json_str(
        r#"{"aitasks": [{"id": "t", "name": "T"}, {"id": "t", "name": "T again"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(_)));
}

/// Fails every capability query for one task and counts calls.
struct Flaky {
    inner: InMemoryKnowledgeStore,
    failing_task: &'static str,
    queries: AtomicUsize,
}

impl KnowledgeStore for Flaky {
    fn get_all(&self, class: &EntityClass) -> Result<Vec<Entity>, StoreError> {
        self.inner.get_all(class)
    }

    fn query(&self, query: &Query) -> Result<Vec<Entity>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if query
            .filters()
            .iter()
            .any(|(attr, value)| attr == REQUIRED_BY_TASK && value == self.failing_task)
        {
            return Err(StoreError::BackendError("connection reset".to_string()));
        }
        self.inner.query(query)
    }
}

#[test]
fn one_failing_task_does_not_stop_the_others() {
    let inner = InMemoryKnowledgeStore::new();
    inner
        .extend(
            &EntityClass::AiTask,
            vec![Entity::new("a", "A"), Entity::new("b", "B")],
        )
        .unwrap();
    inner
        .insert(
            EntityClass::Capability,
            Entity::new("cb", "Cap B")
                .with_attribute(IS_DEFINED_BY_TAXONOMY, "ibm-ai-capabilities")
                .with_attribute(REQUIRED_BY_TASK, "b"),
        )
        .unwrap();
    inner
        .insert(
            EntityClass::Adapter,
            Entity::new("ib", "Intrinsic B").with_attribute(IMPLEMENTS_CAPABILITY, "cb"),
        )
        .unwrap();

    let store = Arc::new(Flaky {
        inner,
        failing_task: "a",
        queries: AtomicUsize::new(0),
    });
    let report = Navigator::new(store.clone()).run("", TaskSource::AllTasks);

    assert!(report
        .capabilities_report
        .starts_with("*Error: Store backend error: connection reset*\n\n"));
    assert!(report.capabilities_report.contains("- **Cap B** (`cb`)"));
    assert!(report.intrinsics_report.contains("Intrinsic B"));
    // Two task queries plus one adapter query.
    assert_eq!(store.queries.load(Ordering::SeqCst), 3);
}
