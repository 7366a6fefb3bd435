//! Knowledge-store contract and the in-memory backend.
//!
//! The graph itself lives outside this crate; everything here talks to it
//! through [`KnowledgeStore`].

mod memory;
mod query;
mod traits;

pub use memory::InMemoryKnowledgeStore;
pub use query::{
    Query, IMPLEMENTS_CAPABILITY, IS_DEFINED_BY_TAXONOMY, IS_PART_OF, REQUIRED_BY_TASK,
};
pub use traits::{KnowledgeStore, StoreError};
