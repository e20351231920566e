//! Main ORM interface for working with a driver.
//!
//! This module provides the entry points callers use:
//!
//! - [`Orm`] - Owns a driver built from a [`DriverBuilder`]
//! - [`EntityManager`] - A lightweight session over the ORM's driver
//!
//! Every entity manager obtained from the same [`Orm`], including forks, shares the
//! driver and therefore the data it stores.
//!
//! # Example
//!
//! ```ignore
//! use ormem::prelude::*;
//!
//! let orm = Orm::init(InMemoryDriver::builder(config)).await?;
//! orm.schema_generator().clear_database().await?;
//!
//! let em = orm.em();
//! em.insert(&Post { id: 1, title: "Hello".into(), created_at: None }).await?;
//! let post = em.fork().find_one::<Post>(Filter::eq("id", 1)).await?;
//! ```

use bson::Document;

use crate::{
    driver::{Driver, DriverBuilder},
    entity::Entity,
    error::DriverResult,
    page::{Page, PaginationParams},
    query::{FilterQuery, FindOptions, QueryResult},
    repository::{Collection, Repository},
    schema::SchemaGenerator,
};

/// An ORM instance bound to a specific driver implementation.
///
/// # Type Parameters
///
/// * `D` - The driver implementation type
#[derive(Debug)]
pub struct Orm<D: Driver> {
    driver: D,
}

impl<D: Driver> Orm<D> {
    /// Wraps an already built driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Builds the driver and opens its connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot be built or fails to connect.
    pub async fn init<B>(builder: B) -> DriverResult<Self>
    where
        B: DriverBuilder<Driver = D>,
    {
        let driver = builder.build().await?;
        driver.connection().connect().await?;

        log::debug!(
            "connected to {} with {} registered entities",
            driver.connection().client_url(),
            driver.metadata().len(),
        );

        Ok(Self::new(driver))
    }

    /// Returns the underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Returns a new entity manager.
    pub fn em(&self) -> EntityManager<'_, D> {
        EntityManager::new(&self.driver)
    }

    /// Returns the driver's schema generator.
    pub fn schema_generator(&self) -> Box<dyn SchemaGenerator + '_> {
        self.driver.schema_generator()
    }

    /// Closes the driver's connection.
    pub async fn close(&self, force: bool) -> DriverResult<()> {
        self.driver.close(force).await
    }

    /// Consumes the ORM and returns its driver.
    pub fn into_driver(self) -> D {
        self.driver
    }
}

/// A session for reading and writing entities.
///
/// Entity managers are cheap handles; [`EntityManager::fork`] returns a new one
/// over the same driver.
#[derive(Debug)]
pub struct EntityManager<'a, D: Driver> {
    driver: &'a D,
}

impl<'a, D: Driver> Clone for EntityManager<'a, D> {
    fn clone(&self) -> Self {
        Self { driver: self.driver }
    }
}

impl<'a, D: Driver> EntityManager<'a, D> {
    pub(crate) fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    /// Returns a fresh entity manager sharing this one's driver.
    pub fn fork(&self) -> Self {
        Self::new(self.driver)
    }

    /// Gets a typed repository for the entity type `E`.
    pub fn repository<E: Entity>(&self) -> Repository<'a, D, E> {
        Repository::new(self.driver)
    }

    /// Gets an untyped collection handle.
    pub fn collection(&self, name: &str) -> Collection<'a, D> {
        Collection::new(name.to_string(), self.driver)
    }

    /// Inserts an entity.
    pub async fn insert<E: Entity>(&self, entity: &E) -> DriverResult<QueryResult> {
        self.repository::<E>().insert(entity).await
    }

    /// Returns the first entity matching `filter`, or `None`.
    pub async fn find_one<E: Entity>(&self, filter: FilterQuery) -> DriverResult<Option<E>> {
        self.repository::<E>().find_one(filter).await
    }

    /// Returns the entities matching `filter`.
    pub async fn find<E: Entity>(&self, filter: FilterQuery, options: FindOptions) -> DriverResult<Vec<E>> {
        self.repository::<E>().find(filter, options).await
    }

    /// Counts the entities matching `filter`.
    pub async fn count<E: Entity>(&self, filter: FilterQuery) -> DriverResult<usize> {
        self.repository::<E>().count(filter).await
    }

    /// Returns one page of entities matching `filter` with the total match count.
    pub async fn find_and_count<E: Entity>(
        &self,
        filter: FilterQuery,
        options: FindOptions,
        params: &PaginationParams,
    ) -> DriverResult<Page<E>> {
        self.repository::<E>()
            .find_and_count(filter, options, params)
            .await
    }

    /// Merges `data` into every entity matching `filter`.
    pub async fn native_update<E: Entity>(&self, filter: FilterQuery, data: Document) -> DriverResult<QueryResult> {
        self.repository::<E>().native_update(filter, data).await
    }

    /// Removes every entity matching `filter`.
    pub async fn native_delete<E: Entity>(&self, filter: FilterQuery) -> DriverResult<QueryResult> {
        self.repository::<E>().native_delete(filter).await
    }
}
