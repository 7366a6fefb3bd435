//! # capnav - Capability navigation over an AI knowledge graph
//!
//! capnav turns a free-text use-case description into the concrete
//! building blocks that can implement it. An inference engine identifies the
//! AI tasks the intent calls for, the knowledge graph maps every task to the
//! capabilities it requires, and each capability to the adapters
//! ("intrinsics") implementing it.
//!
//! ## Core Concepts
//!
//! - **Entity**: A node of the knowledge graph (task, capability, adapter)
//! - **KnowledgeStore**: Read access to the graph by class and by attribute filter
//! - **InferenceEngine**: A chat-completion backend answering batches of conversations
//! - **Navigator**: The intent → tasks → capabilities → intrinsics pipeline
//! - **Judge**: A binary scorer over model output, with log-probability confidences
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use capnav::{Entity, EntityClass, InMemoryKnowledgeStore, Navigator, TaskSource};
//! use capnav::storage::{IS_DEFINED_BY_TAXONOMY, REQUIRED_BY_TASK};
//!
//! let store = InMemoryKnowledgeStore::new();
//! store.insert(EntityClass::AiTask, Entity::new("summarization", "Summarization"))?;
//! store.insert(
//!     EntityClass::Capability,
//!     Entity::new("abstraction", "Abstraction")
//!         .with_attribute(IS_DEFINED_BY_TAXONOMY, "ibm-ai-capabilities")
//!         .with_attribute(REQUIRED_BY_TASK, "summarization"),
//! )?;
//!
//! let navigator = Navigator::new(Arc::new(store));
//! let report = navigator.run("", TaskSource::AllTasks);
//! assert!(report.capabilities_report.contains("**Abstraction**"));
//! # Ok::<(), capnav::storage::StoreError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Graph model and access
pub mod entity;
pub mod error;
pub mod storage;

// Inference and judging
pub mod identify;
pub mod inference;
pub mod judge;

// Pipeline
pub mod config;
pub mod pipeline;
pub mod report;
pub mod resolve;

// Re-export primary types at crate root for convenience
pub use config::NavigatorConfig;
pub use entity::{AttributeValue, Entity, EntityClass, TaskId};
pub use error::{IdentifyError, InferenceError, JudgeError, NavError, NavResult};
pub use identify::{parse_task_list, TaskIdentifier};
pub use inference::{ChatRole, ChatTurn, Conversation, InferenceEngine, Prediction};
pub use judge::{Guardian, Judge, JudgeConfig, JudgeInput, LabelVocabulary, RowScore};
pub use pipeline::{
    CatalogRow, CatalogSummary, ExplorationReport, Navigator, PipelineReport, TaskSource,
};
pub use resolve::{
    CapabilityResolution, CapabilityResolver, IntrinsicResolution, IntrinsicResolver,
    ResolveStrategy,
};
pub use storage::{InMemoryKnowledgeStore, KnowledgeStore, Query, StoreError};
