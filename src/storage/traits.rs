//! Abstract knowledge-store trait.
//!
//! The store is an external collaborator: this crate never owns the graph,
//! it only reads it through this contract. By using a trait we enable:
//! - the in-memory backend for tests, embedding and the CLI
//! - adapters over remote graph services

use thiserror::Error;

use crate::entity::{Entity, EntityClass};
use crate::storage::query::Query;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The class is not known to the store.
    #[error("Unknown entity class: {0}")]
    UnknownClass(String),

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Backend error.
    #[error("Store backend error: {0}")]
    BackendError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Reading a graph document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only access to the knowledge graph.
///
/// Implementations must be safe to call from several threads at once;
/// parallel resolution issues independent queries concurrently.
pub trait KnowledgeStore: Send + Sync {
    /// Every entity of a class. No pagination.
    fn get_all(&self, class: &EntityClass) -> Result<Vec<Entity>, StoreError>;

    /// Entities of `query.class()` matching every filter exactly.
    fn query(&self, query: &Query) -> Result<Vec<Entity>, StoreError>;

    /// Look up one entity by id.
    ///
    /// The default scans [`get_all`](Self::get_all); backends with an id
    /// index should override it.
    fn get(&self, class: &EntityClass, id: &str) -> Result<Option<Entity>, StoreError> {
        Ok(self.get_all(class)?.into_iter().find(|e| e.id == id))
    }

    /// Number of entities in a class.
    fn count(&self, class: &EntityClass) -> Result<usize, StoreError> {
        Ok(self.get_all(class)?.len())
    }
}
