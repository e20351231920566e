//! Collection handles for driver operations.
//!
//! This module provides handles bound to a single collection. They offer both
//! typed access (entities are converted to and from documents) and raw document
//! access for callers that work below the entity layer.
//!
//! # Handle Types
//!
//! - [`Collection`] - Untyped handle with explicit BSON documents
//! - [`Repository`] - Typed handle for a specific entity type
//!
//! # Example
//!
//! ```ignore
//! let posts = orm.em().repository::<Post>();
//! posts.insert(&Post { id: 1, title: "Hello".into(), created_at: None }).await?;
//!
//! let found = posts.find_one(Filter::eq("id", 1)).await?;
//! ```

use bson::Document;
use std::marker::PhantomData;

use crate::{
    driver::Driver,
    entity::{Entity, EntityExt},
    error::{DriverError, DriverResult},
    page::{Page, PaginationParams},
    query::{FilterQuery, FindOptions, QueryResult},
};

/// An untyped collection handle with a reference to a driver.
///
/// All documents are represented as BSON documents, providing maximum flexibility
/// but without compile-time type safety.
#[derive(Debug)]
pub struct Collection<'a, D: Driver> {
    name: String,
    driver: &'a D,
}

impl<'a, D: Driver> Collection<'a, D> {
    pub(crate) fn new(name: String, driver: &'a D) -> Self {
        Self { name, driver }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a document.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::DuplicateKey`](crate::error::DriverError::DuplicateKey)
    /// if a document with the same primary key exists.
    pub async fn insert(&self, data: Document) -> DriverResult<QueryResult> {
        self.driver
            .native_insert(self.name(), data)
            .await
    }

    /// Inserts several documents through the driver's bulk path.
    pub async fn insert_many(&self, data: Vec<Document>) -> DriverResult<QueryResult> {
        self.driver
            .native_insert_many(self.name(), data)
            .await
    }

    /// Returns the first matching document, or `None`.
    pub async fn find_one(&self, filter: FilterQuery) -> DriverResult<Option<Document>> {
        self.driver
            .find_one(self.name(), filter, FindOptions::default())
            .await
    }

    /// Returns the matching documents.
    pub async fn find(&self, filter: FilterQuery, options: FindOptions) -> DriverResult<Vec<Document>> {
        self.driver
            .find(self.name(), filter, options)
            .await
    }

    /// Counts the matching documents.
    pub async fn count(&self, filter: FilterQuery) -> DriverResult<usize> {
        self.driver.count(self.name(), filter).await
    }

    /// Merges `data` into every matching document.
    pub async fn update(&self, filter: FilterQuery, data: Document) -> DriverResult<QueryResult> {
        self.driver
            .native_update(self.name(), filter, data)
            .await
    }

    /// Removes every matching document.
    pub async fn delete(&self, filter: FilterQuery) -> DriverResult<QueryResult> {
        self.driver
            .native_delete(self.name(), filter)
            .await
    }

    /// Returns one page of matching documents together with the total match count.
    ///
    /// Sort keys from `options` are kept; its limit and offset are replaced by `params`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidQuery`] if `params.per_page` is zero.
    pub async fn find_and_count(
        &self,
        filter: FilterQuery,
        options: FindOptions,
        params: &PaginationParams,
    ) -> DriverResult<Page<Document>> {
        if params.per_page == 0 {
            return Err(DriverError::InvalidQuery("per_page must be at least 1".into()));
        }

        let count = self.count(filter.clone()).await?;
        let items = self
            .find(
                filter,
                FindOptions {
                    limit: Some(params.per_page),
                    offset: Some(params.offset()),
                    ..options
                },
            )
            .await?;

        Ok(params.page_of(items, count))
    }
}

/// A typed collection handle for entities of type `E`.
#[derive(Debug)]
pub struct Repository<'a, D: Driver, E: Entity> {
    collection: Collection<'a, D>,
    _marker: PhantomData<E>,
}

impl<'a, D: Driver, E: Entity> Repository<'a, D, E> {
    pub(crate) fn new(driver: &'a D) -> Self {
        Self {
            collection: Collection::new(E::entity_name().to_string(), driver),
            _marker: PhantomData,
        }
    }

    /// Returns the name of the underlying collection.
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// Drops down to the untyped handle of the same collection.
    pub fn collection(&self) -> &Collection<'a, D> {
        &self.collection
    }

    /// Inserts an entity and returns the driver's result, whose `insert_id` is the
    /// entity's primary key.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the primary key is taken.
    pub async fn insert(&self, entity: &E) -> DriverResult<QueryResult> {
        self.collection
            .insert(entity.to_document()?)
            .await
    }

    /// Inserts several entities through the driver's bulk path.
    pub async fn insert_many(&self, entities: &[E]) -> DriverResult<QueryResult> {
        self.collection
            .insert_many(
                entities
                    .iter()
                    .map(EntityExt::to_document)
                    .collect::<DriverResult<Vec<_>>>()?,
            )
            .await
    }

    /// Returns the first matching entity, or `None`.
    pub async fn find_one(&self, filter: FilterQuery) -> DriverResult<Option<E>> {
        self.collection
            .find_one(filter)
            .await?
            .map(E::from_document)
            .transpose()
    }

    /// Returns the matching entities.
    pub async fn find(&self, filter: FilterQuery, options: FindOptions) -> DriverResult<Vec<E>> {
        self.collection
            .find(filter, options)
            .await?
            .into_iter()
            .map(E::from_document)
            .collect()
    }

    /// Counts the matching entities.
    pub async fn count(&self, filter: FilterQuery) -> DriverResult<usize> {
        self.collection.count(filter).await
    }

    /// Returns one page of matching entities together with the total match count.
    pub async fn find_and_count(
        &self,
        filter: FilterQuery,
        options: FindOptions,
        params: &PaginationParams,
    ) -> DriverResult<Page<E>> {
        self.collection
            .find_and_count(filter, options, params)
            .await?
            .try_map(E::from_document)
    }

    /// Merges `data` into every matching entity's document.
    pub async fn native_update(&self, filter: FilterQuery, data: Document) -> DriverResult<QueryResult> {
        self.collection.update(filter, data).await
    }

    /// Removes every matching entity.
    pub async fn native_delete(&self, filter: FilterQuery) -> DriverResult<QueryResult> {
        self.collection.delete(filter).await
    }
}
