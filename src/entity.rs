//! Entity types read from the knowledge store.
//!
//! Entities are read-only views: the store owns them, this crate only
//! inspects `id`, `name`, the optional `description` and the relation
//! attributes that drive queries (`requiredByTask`, `implementsCapability`,
//! `isDefinedByTaxonomy`, `isPartOf`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Class name of AI task entities.
pub const AITASKS_CLASS: &str = "aitasks";

/// Class name of capability entities.
pub const CAPABILITIES_CLASS: &str = "capabilities";

/// Class name of adapter (intrinsic) entities.
pub const ADAPTERS_CLASS: &str = "adapters";

/// Classification of knowledge-store entities.
///
/// Serialized as the store's class name, e.g. `"capabilities"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityClass {
    /// An AI task such as "Question Answering".
    AiTask,
    /// A capability required by one or more tasks.
    Capability,
    /// An adapter or intrinsic implementing one or more capabilities.
    Adapter,
    /// Any other class known to the store.
    Custom(String),
}

impl EntityClass {
    /// Returns the store-side class name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AiTask => AITASKS_CLASS,
            Self::Capability => CAPABILITIES_CLASS,
            Self::Adapter => ADAPTERS_CLASS,
            Self::Custom(name) => name,
        }
    }

    /// Maps a store-side class name onto a class.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            AITASKS_CLASS => Self::AiTask,
            CAPABILITIES_CLASS => Self::Capability,
            ADAPTERS_CLASS => Self::Adapter,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EntityClass {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<EntityClass> for String {
    fn from(class: EntityClass) -> Self {
        class.as_str().to_string()
    }
}

/// Value of a relation attribute: a single id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Single-valued attribute.
    One(String),
    /// Multi-valued attribute.
    Many(Vec<String>),
    /// Any other JSON value (null, number, object, ...). Kept for
    /// round-tripping; never matches a query.
    Other(serde_json::Value),
}

impl AttributeValue {
    /// Exact-match test; a list matches when any element equals `value`.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::One(v) => v == value,
            Self::Many(values) => values.iter().any(|v| v == value),
            Self::Other(_) => false,
        }
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::One(v) => Some(v.as_str()),
            Self::Many(values) => values.first().map(String::as_str),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// A record owned by the knowledge store.
///
/// `id` is unique within a class; `name` is for display and not
/// guaranteed unique.
///
/// # Examples
///
/// ```
/// use capnav::Entity;
///
/// let cap = Entity::new("reading-comprehension", "Reading Comprehension")
///     .with_description("Understand written passages")
///     .with_attribute("requiredByTask", "question-answering");
/// assert!(cap.attribute_matches("requiredByTask", "question-answering"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable key within the entity's class.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-text description; may be absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Relation attributes and every other field of the record.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Entity {
    /// Creates an entity with no description and no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a value to an attribute, promoting it to a list when needed.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Adds a value to an attribute, promoting it to a list when needed.
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let key = key.into();
        let next = match self.attributes.remove(&key) {
            None | Some(AttributeValue::Other(_)) => AttributeValue::One(value),
            Some(AttributeValue::One(existing)) => AttributeValue::Many(vec![existing, value]),
            Some(AttributeValue::Many(mut values)) => {
                values.push(value);
                AttributeValue::Many(values)
            }
        };
        self.attributes.insert(key, next);
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Returns true if the attribute exists and matches `value` exactly.
    #[must_use]
    pub fn attribute_matches(&self, key: &str, value: &str) -> bool {
        self.attributes.get(key).is_some_and(|v| v.matches(value))
    }

    /// Returns the description when present and non-empty.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Returns the description truncated to `limit` characters, with `...`
    /// appended when something was cut.
    #[must_use]
    pub fn description_excerpt(&self, limit: usize) -> Option<String> {
        self.description().map(|d| truncate_with_ellipsis(d, limit))
    }
}

/// Truncates to `limit` characters (not bytes) and appends `...` if cut.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Lookup key of an AI task.
///
/// Derived from a task name by lower-casing and replacing each space with a
/// hyphen. No other characters are touched, so punctuation survives as-is.
///
/// # Examples
///
/// ```
/// use capnav::TaskId;
///
/// assert_eq!(TaskId::from_name("Question Answering").as_str(), "question-answering");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Normalizes a task name into its lookup id.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(name.to_lowercase().replace(' ', "-"))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
