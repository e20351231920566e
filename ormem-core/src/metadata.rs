//! Entity metadata consumed by drivers.
//!
//! Drivers never inspect entity types directly. Everything they need to know about
//! an entity (its collection name, primary key fields and per-property defaults)
//! is described by an [`EntityMetadata`] registered in a [`MetadataStorage`].

use bson::{Bson, Document};
use std::collections::HashMap;

use crate::error::{DriverError, DriverResult};

/// A rule that produces a value for a property the caller left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultRule {
    /// Use the current time at insert.
    CurrentTimestamp,
}

impl DefaultRule {
    /// Recognizes a raw default expression, ignoring case.
    ///
    /// Returns `None` for expressions that have no in-memory equivalent.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("current_timestamp") {
            Some(DefaultRule::CurrentTimestamp)
        } else {
            None
        }
    }
}

/// A single mapped property of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityProperty {
    /// The field name as stored in documents.
    pub name: String,
    /// Raw default expression, e.g. `"current_timestamp"`.
    pub default_raw: Option<String>,
}

impl EntityProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), default_raw: None }
    }

    /// Attaches a raw default expression to this property.
    pub fn with_default_raw(mut self, raw: impl Into<String>) -> Self {
        self.default_raw = Some(raw.into());
        self
    }

    /// The default rule declared for this property, if it is one the driver understands.
    pub fn default_rule(&self) -> Option<DefaultRule> {
        self.default_raw
            .as_deref()
            .and_then(DefaultRule::parse)
    }
}

/// Describes how an entity is mapped onto a collection.
///
/// # Example
///
/// ```ignore
/// use ormem_core::metadata::{EntityMetadata, EntityProperty};
///
/// let meta = EntityMetadata::new("Post")
///     .primary_key("id")
///     .property(EntityProperty::new("title"))
///     .property(EntityProperty::new("created_at").with_default_raw("current_timestamp"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMetadata {
    /// Entity name, which is also the collection name.
    pub name: String,
    /// Primary key field names in declared order.
    pub primary_keys: Vec<String>,
    /// Mapped properties.
    pub properties: Vec<EntityProperty>,
}

impl EntityMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_keys: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Appends a primary key field. Primary keys are also registered as properties.
    pub fn primary_key(mut self, field: impl Into<String>) -> Self {
        let field = field.into();

        if !self.properties.iter().any(|prop| prop.name == field) {
            self.properties.push(EntityProperty::new(field.clone()));
        }
        self.primary_keys.push(field);
        self
    }

    /// Appends a mapped property.
    pub fn property(mut self, property: EntityProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// The primary-key-only sub-document of `data`.
    ///
    /// Key fields absent from `data` are left out, so a document carrying no key
    /// fields yields an empty sub-document.
    pub fn primary_key_filter(&self, data: &Document) -> Document {
        self.primary_keys
            .iter()
            .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
            .collect()
    }

    /// Extracts the identifying value of `data`.
    ///
    /// A single key yields its value. A composite key yields an array of the key
    /// values in declared order, with missing parts as `null`. Returns `None` when
    /// the entity has no key or `data` carries none of the key fields.
    pub fn primary_key_value(&self, data: &Document) -> Option<Bson> {
        match self.primary_keys.as_slice() {
            [] => None,
            [key] => data.get(key).cloned(),
            keys => {
                if keys.iter().all(|key| !data.contains_key(key)) {
                    return None;
                }

                Some(Bson::Array(
                    keys.iter()
                        .map(|key| data.get(key).cloned().unwrap_or(Bson::Null))
                        .collect(),
                ))
            }
        }
    }

    /// Properties that carry a recognized default rule.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, DefaultRule)> {
        self.properties
            .iter()
            .filter_map(|prop| prop.default_rule().map(|rule| (prop.name.as_str(), rule)))
    }
}

/// Registry of entity metadata, keyed by entity name.
#[derive(Debug, Clone, Default)]
pub struct MetadataStorage {
    entities: HashMap<String, EntityMetadata>,
}

impl MetadataStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the metadata of an entity.
    pub fn register(&mut self, metadata: EntityMetadata) {
        self.entities.insert(metadata.name.clone(), metadata);
    }

    /// Looks up the metadata of `entity`, if registered.
    pub fn find(&self, entity: &str) -> Option<&EntityMetadata> {
        self.entities.get(entity)
    }

    /// Looks up the metadata of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::MetadataNotFound`] if the entity was never registered.
    pub fn get(&self, entity: &str) -> DriverResult<&EntityMetadata> {
        self.find(entity)
            .ok_or_else(|| DriverError::MetadataNotFound(entity.to_string()))
    }

    /// Names of all registered entities.
    pub fn entity_names(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<EntityMetadata> for MetadataStorage {
    fn from_iter<I: IntoIterator<Item = EntityMetadata>>(iter: I) -> Self {
        let mut storage = MetadataStorage::new();

        for metadata in iter {
            storage.register(metadata);
        }
        storage
    }
}
