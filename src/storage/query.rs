//! Exact-match store queries.

use std::fmt;

use crate::entity::{Entity, EntityClass};

/// Attribute linking a capability to the tasks that require it.
pub const REQUIRED_BY_TASK: &str = "requiredByTask";

/// Attribute naming the taxonomy a capability is defined by.
pub const IS_DEFINED_BY_TAXONOMY: &str = "isDefinedByTaxonomy";

/// Attribute linking an adapter to the capabilities it implements.
pub const IMPLEMENTS_CAPABILITY: &str = "implementsCapability";

/// Attribute naming the group a capability belongs to.
pub const IS_PART_OF: &str = "isPartOf";

/// A conjunction of exact-match `(attribute, value)` filters over one class.
///
/// # Example
/// ```
/// use capnav::{EntityClass, Query};
///
/// let query = Query::new(EntityClass::Adapter)
///     .filter("implementsCapability", "reading-comprehension");
/// assert_eq!(query.filters().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    class: EntityClass,
    filters: Vec<(String, String)>,
}

impl Query {
    /// Creates an unfiltered query over `class`.
    #[must_use]
    pub fn new(class: EntityClass) -> Self {
        Self {
            class,
            filters: Vec::new(),
        }
    }

    /// Adds an exact-match filter.
    #[must_use]
    pub fn filter(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((attribute.into(), value.into()));
        self
    }

    /// Capabilities required by `task_id` within `taxonomy`.
    #[must_use]
    pub fn capabilities_for_task(task_id: &str, taxonomy: &str) -> Self {
        Self::new(EntityClass::Capability)
            .filter(REQUIRED_BY_TASK, task_id)
            .filter(IS_DEFINED_BY_TAXONOMY, taxonomy)
    }

    /// Adapters implementing `capability_id`.
    #[must_use]
    pub fn adapters_for_capability(capability_id: &str) -> Self {
        Self::new(EntityClass::Adapter).filter(IMPLEMENTS_CAPABILITY, capability_id)
    }

    /// The class this query targets.
    #[must_use]
    pub const fn class(&self) -> &EntityClass {
        &self.class
    }

    /// The filter conjunction.
    #[must_use]
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    /// Returns true if `entity` satisfies every filter.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        self.filters.iter().all(|(key, value)| match key.as_str() {
            "id" => entity.id == *value,
            "name" => entity.name == *value,
            _ => entity.attribute_matches(key, value),
        })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.class)?;
        for (i, (key, value)) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_query_requires_both_filters() {
        let query = Query::capabilities_for_task("summarization", "ibm-ai-capabilities");
        let inside = Entity::new("c1", "C1")
            .with_attribute(REQUIRED_BY_TASK, "summarization")
            .with_attribute(IS_DEFINED_BY_TAXONOMY, "ibm-ai-capabilities");
        let other_taxonomy = Entity::new("c2", "C2")
            .with_attribute(REQUIRED_BY_TASK, "summarization")
            .with_attribute(IS_DEFINED_BY_TAXONOMY, "other-taxonomy");

        assert!(query.matches(&inside));
        assert!(!query.matches(&other_taxonomy));
    }

    #[test]
    fn test_id_and_name_filters() {
        let entity = Entity::new("c1", "Comprehension");
        assert!(Query::new(EntityClass::Capability).filter("id", "c1").matches(&entity));
        assert!(!Query::new(EntityClass::Capability).filter("name", "c1").matches(&entity));
    }

    #[test]
    fn test_query_display() {
        let query = Query::adapters_for_capability("c1");
        assert_eq!(query.to_string(), "adapters(implementsCapability=c1)");
    }
}
