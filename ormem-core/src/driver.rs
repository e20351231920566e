//! The driver contract.
//!
//! This module defines the traits that every storage driver implements so the ORM
//! facade can run against it: reads (`find_one`, `find`, `count`), writes
//! (`native_insert`, `native_update`, `native_delete`) and access to the
//! driver's connection, schema generator and entity metadata.
//!
//! # Traits
//!
//! - [`Driver`]: The core trait for storage drivers
//! - [`DriverBuilder`]: Factory trait for creating driver instances
//!
//! # Examples
//!
//! ```ignore
//! use ormem::prelude::*;
//! use bson::doc;
//!
//! let driver = InMemoryDriver::builder(config).build().await?;
//!
//! driver.native_insert("Post", doc! { "id": 1, "title": "Hello" }).await?;
//! let post = driver.find_one("Post", doc! { "id": 1 }, FindOptions::default()).await?;
//! ```

use async_trait::async_trait;
use bson::Document;
use std::{fmt::Debug, sync::Arc};

use crate::{
    connection::Connection,
    error::DriverResult,
    metadata::MetadataStorage,
    query::{FilterQuery, FindOptions, QueryResult},
    schema::SchemaGenerator,
};

/// Abstract interface for storage drivers.
///
/// Filters use the query-by-example vocabulary of [`crate::query`]. Entity names
/// double as collection names.
///
/// # Error Handling
///
/// Operations return [`DriverResult<T>`](crate::error::DriverResult). A single
/// read that finds nothing returns `Ok(None)`; drivers report operations they do
/// not implement with [`DriverError::Unsupported`](crate::error::DriverError::Unsupported).
#[async_trait]
pub trait Driver: Send + Sync + Debug {
    /// Returns the first document matching `filter` after sorting and offset.
    ///
    /// Any `limit` in `options` is replaced by 1.
    async fn find_one(
        &self,
        entity: &str,
        filter: FilterQuery,
        options: FindOptions,
    ) -> DriverResult<Option<Document>>;

    /// Returns the documents matching `filter`, sorted, then offset, then limited.
    async fn find(
        &self,
        entity: &str,
        filter: FilterQuery,
        options: FindOptions,
    ) -> DriverResult<Vec<Document>>;

    /// Counts the documents matching `filter`, ignoring sort and pagination.
    async fn count(&self, entity: &str, filter: FilterQuery) -> DriverResult<usize>;

    /// Inserts a single document.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::DuplicateKey`](crate::error::DriverError::DuplicateKey)
    /// if a document with the same primary key exists. Nothing is written in that case.
    async fn native_insert(&self, entity: &str, data: Document) -> DriverResult<QueryResult>;

    /// Inserts several documents at once.
    async fn native_insert_many(
        &self,
        entity: &str,
        data: Vec<Document>,
    ) -> DriverResult<QueryResult>;

    /// Merges `data` into every document matching `filter`.
    async fn native_update(
        &self,
        entity: &str,
        filter: FilterQuery,
        data: Document,
    ) -> DriverResult<QueryResult>;

    /// Removes every document matching `filter`.
    async fn native_delete(&self, entity: &str, filter: FilterQuery) -> DriverResult<QueryResult>;

    /// The connection of this driver.
    fn connection(&self) -> &dyn Connection;

    /// A schema generator bound to this driver.
    fn schema_generator(&self) -> Box<dyn SchemaGenerator + '_>;

    /// Metadata of the entities this driver was configured with.
    fn metadata(&self) -> &MetadataStorage;

    /// Closes the driver's connection.
    async fn close(&self, force: bool) -> DriverResult<()> {
        self.connection().close(force).await
    }
}

#[async_trait]
impl<D> Driver for Arc<D>
where
    D: Driver,
{
    async fn find_one(
        &self,
        entity: &str,
        filter: FilterQuery,
        options: FindOptions,
    ) -> DriverResult<Option<Document>> {
        (**self)
            .find_one(entity, filter, options)
            .await
    }

    async fn find(
        &self,
        entity: &str,
        filter: FilterQuery,
        options: FindOptions,
    ) -> DriverResult<Vec<Document>> {
        (**self)
            .find(entity, filter, options)
            .await
    }

    async fn count(&self, entity: &str, filter: FilterQuery) -> DriverResult<usize> {
        (**self).count(entity, filter).await
    }

    async fn native_insert(&self, entity: &str, data: Document) -> DriverResult<QueryResult> {
        (**self).native_insert(entity, data).await
    }

    async fn native_insert_many(
        &self,
        entity: &str,
        data: Vec<Document>,
    ) -> DriverResult<QueryResult> {
        (**self)
            .native_insert_many(entity, data)
            .await
    }

    async fn native_update(
        &self,
        entity: &str,
        filter: FilterQuery,
        data: Document,
    ) -> DriverResult<QueryResult> {
        (**self)
            .native_update(entity, filter, data)
            .await
    }

    async fn native_delete(&self, entity: &str, filter: FilterQuery) -> DriverResult<QueryResult> {
        (**self).native_delete(entity, filter).await
    }

    fn connection(&self) -> &dyn Connection {
        (**self).connection()
    }

    fn schema_generator(&self) -> Box<dyn SchemaGenerator + '_> {
        (**self).schema_generator()
    }

    fn metadata(&self) -> &MetadataStorage {
        (**self).metadata()
    }

    async fn close(&self, force: bool) -> DriverResult<()> {
        (**self).close(force).await
    }
}

#[async_trait]
pub trait DriverBuilder {
    type Driver: Driver;

    async fn build(self) -> DriverResult<Self::Driver>;
}
