//! Core traits for mapped entities and their document conversions.
//!
//! This module provides the trait that typed entities implement to be stored through
//! a driver, as well as utilities for converting them to and from BSON documents and JSON.

use bson::{Bson, Document, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::{
    error::{DriverError, DriverResult},
    metadata::EntityMetadata,
};

/// Core trait that all mapped entities must implement.
///
/// An entity names the collection it lives in and describes its primary keys and
/// defaults through [`EntityMetadata`]. The metadata name must equal
/// [`Entity::entity_name`].
///
/// # Example
///
/// ```ignore
/// use ormem::prelude::*;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Post {
///     pub id: i32,
///     pub title: String,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     pub created_at: Option<bson::DateTime>,
/// }
///
/// impl Entity for Post {
///     fn entity_name() -> &'static str {
///         "Post"
///     }
///
///     fn metadata() -> EntityMetadata {
///         EntityMetadata::new(Self::entity_name())
///             .primary_key("id")
///             .property(EntityProperty::new("title"))
///             .property(EntityProperty::new("created_at").with_default_raw("current_timestamp"))
///     }
/// }
/// ```
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the entity, used as its collection name.
    fn entity_name() -> &'static str;

    /// Describes primary keys and properties of the entity.
    fn metadata() -> EntityMetadata;
}

/// Extension trait providing serialization/deserialization utilities for entities.
///
/// This trait is automatically implemented for all types that implement [`Entity`].
pub trait EntityExt: Entity {
    /// Converts this entity to a BSON document for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the entity does not serialize to a document.
    fn to_document(&self) -> DriverResult<Document>;

    /// Creates an entity from a BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_document(document: Document) -> DriverResult<Self>;

    /// Converts this entity to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> DriverResult<Value>;

    /// Creates an entity from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_json(value: Value) -> DriverResult<Self>;
}

impl<E: Entity> EntityExt for E {
    fn to_document(&self) -> DriverResult<Document> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            other => Err(DriverError::InvalidDocument(format!(
                "{} serialized to {:?} instead of a document",
                E::entity_name(),
                other.element_type(),
            ))),
        }
    }

    fn from_document(document: Document) -> DriverResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }

    fn to_json(&self) -> DriverResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> DriverResult<Self> {
        Ok(from_value(value)?)
    }
}
