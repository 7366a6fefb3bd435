//! In-memory knowledge store.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`KnowledgeStore`]. It is intended for embedded usage, tests, and the CLI
//! driver, and as a reference implementation of the query contract.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::RwLock;

use crate::entity::{Entity, EntityClass};
use crate::storage::query::Query;
use crate::storage::traits::{KnowledgeStore, StoreError};

fn lock_err(context: &'static str) -> StoreError {
    StoreError::BackendError(format!("poisoned lock: {context}"))
}

#[derive(Debug)]
struct ClassState {
    entities: Vec<Entity>,
    by_id: HashMap<String, usize>,
}

impl ClassState {
    fn new() -> Self {
        Self {
            entities: Vec::new(),
            by_id: HashMap::new(),
        }
    }
}

#[derive(Debug)]
struct GraphState {
    classes: BTreeMap<EntityClass, ClassState>,
}

impl Default for GraphState {
    fn default() -> Self {
        let mut classes = BTreeMap::new();
        for class in [EntityClass::AiTask, EntityClass::Capability, EntityClass::Adapter] {
            classes.insert(class, ClassState::new());
        }
        Self { classes }
    }
}

/// Thread-safe in-memory knowledge store.
///
/// The three core classes (`aitasks`, `capabilities`, `adapters`) always
/// exist, possibly empty. Any other class exists once an entity of it has
/// been inserted; reading a class that does not exist is
/// [`StoreError::UnknownClass`].
///
/// Entity order within a class is insertion order.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeStore {
    state: RwLock<GraphState>,
}

impl InMemoryKnowledgeStore {
    /// Create a new store holding the empty core classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity. Returns error if the id already exists in `class`.
    pub fn insert(&self, class: EntityClass, entity: Entity) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| lock_err("graph.insert"))?;
        let slot = state.classes.entry(class.clone()).or_insert_with(ClassState::new);
        if slot.by_id.contains_key(&entity.id) {
            return Err(StoreError::DuplicateKey(format!("{class}/{}", entity.id)));
        }
        slot.by_id.insert(entity.id.clone(), slot.entities.len());
        slot.entities.push(entity);
        Ok(())
    }

    /// Insert many entities of one class, stopping at the first duplicate.
    pub fn extend(
        &self,
        class: &EntityClass,
        entities: impl IntoIterator<Item = Entity>,
    ) -> Result<(), StoreError> {
        for entity in entities {
            self.insert(class.clone(), entity)?;
        }
        Ok(())
    }

    /// Build a store from a JSON graph document.
    ///
    /// The document is an object keyed by class name, each value a list of
    /// entities:
    ///
    /// ```json
    /// { "aitasks": [{"id": "summarization", "name": "Summarization"}],
    ///   "capabilities": [], "adapters": [] }
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let graph: BTreeMap<String, Vec<Entity>> = serde_json::from_str(json)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        Self::from_graph(graph)
    }

    /// Build a store from a reader yielding a JSON graph document.
    pub fn from_reader(reader: impl Read) -> Result<Self, StoreError> {
        let graph: BTreeMap<String, Vec<Entity>> = serde_json::from_reader(reader)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        Self::from_graph(graph)
    }

    /// Build a store from a JSON graph document on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_graph(graph: BTreeMap<String, Vec<Entity>>) -> Result<Self, StoreError> {
        let store = Self::new();
        for (class_name, entities) in graph {
            let class = EntityClass::from_name(&class_name);
            store.extend(&class, entities)?;
        }
        Ok(store)
    }

    /// Names of every class currently held.
    pub fn classes(&self) -> Result<Vec<EntityClass>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("graph.classes"))?;
        Ok(state.classes.keys().cloned().collect())
    }
}

impl KnowledgeStore for InMemoryKnowledgeStore {
    fn get_all(&self, class: &EntityClass) -> Result<Vec<Entity>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("graph.get_all"))?;
        state
            .classes
            .get(class)
            .map(|slot| slot.entities.clone())
            .ok_or_else(|| StoreError::UnknownClass(class.to_string()))
    }

    fn query(&self, query: &Query) -> Result<Vec<Entity>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("graph.query"))?;
        let slot = state
            .classes
            .get(query.class())
            .ok_or_else(|| StoreError::UnknownClass(query.class().to_string()))?;
        Ok(slot
            .entities
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }

    fn get(&self, class: &EntityClass, id: &str) -> Result<Option<Entity>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("graph.get"))?;
        let slot = state
            .classes
            .get(class)
            .ok_or_else(|| StoreError::UnknownClass(class.to_string()))?;
        Ok(slot.by_id.get(id).map(|&idx| slot.entities[idx].clone()))
    }

    fn count(&self, class: &EntityClass) -> Result<usize, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("graph.count"))?;
        state
            .classes
            .get(class)
            .map(|slot| slot.entities.len())
            .ok_or_else(|| StoreError::UnknownClass(class.to_string()))
    }
}
