//! The in-memory driver.
//!
//! [`InMemoryDriver`] implements the [`Driver`] contract over a process-local
//! [`DocumentStore`] guarded by an async-aware read-write lock.

use std::sync::Arc;
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::Document;

use ormem_core::{
    config::Configuration,
    connection::Connection,
    driver::{Driver, DriverBuilder},
    error::{DriverError, DriverResult},
    metadata::MetadataStorage,
    query::{FilterQuery, FindOptions, QueryResult},
    schema::SchemaGenerator,
};

use crate::{
    connection::InMemoryConnection,
    evaluator::FilterMatcher,
    executor,
    insert::InsertPipeline,
    schema::InMemorySchemaGenerator,
    store::DocumentStore,
};

/// Thread-safe in-memory storage driver.
///
/// Each entity is stored in a collection named after it. Filters are translated
/// and compiled before the store lock is taken, so an invalid filter never blocks
/// other sessions.
///
/// # Thread Safety
///
/// `InMemoryDriver` is cloneable and uses `Arc`-wrapped internal state. Clones of
/// the same instance share the same underlying data.
///
/// # Performance
///
/// Every query scans its whole collection; there is no indexing.
///
/// # Example
///
/// ```ignore
/// use ormem_memory::InMemoryDriver;
/// use ormem_core::{driver::{Driver, DriverBuilder}, query::FindOptions};
/// use bson::doc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let driver = InMemoryDriver::builder(config).build().await?;
///
///     driver.native_insert("Post", doc! { "id": 1, "title": "Hello" }).await?;
///     let posts = driver.find("Post", doc! {}, FindOptions::default()).await?;
///     assert_eq!(posts.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryDriver {
    /// The collection store shared by every clone of this driver
    store: Arc<RwLock<DocumentStore>>,
    config: Arc<Configuration>,
    connection: Arc<InMemoryConnection>,
}

impl InMemoryDriver {
    /// Creates a driver with an empty store.
    pub fn new(config: Configuration) -> Self {
        Self {
            store: Arc::new(RwLock::new(DocumentStore::new())),
            connection: Arc::new(InMemoryConnection::new(&config)),
            config: Arc::new(config),
        }
    }

    /// Creates a builder for `config`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use ormem_memory::InMemoryDriver;
    ///
    /// let driver = InMemoryDriver::builder(config).build().await?;
    /// ```
    pub fn builder(config: Configuration) -> InMemoryDriverBuilder {
        InMemoryDriverBuilder::new(config)
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Names of the collections touched so far.
    pub async fn collection_names(&self) -> Vec<String> {
        self.store
            .read()
            .await
            .collection_names()
    }
}

#[async_trait]
impl Driver for InMemoryDriver {
    async fn find_one(
        &self,
        entity: &str,
        filter: FilterQuery,
        options: FindOptions,
    ) -> DriverResult<Option<Document>> {
        log::debug!("find_one {} where {}", entity, filter);

        let matcher = FilterMatcher::compile(&filter)?;
        let store = self.store.read().await;

        Ok(
            store
                .peek(entity)
                .and_then(|documents| executor::find_first(documents, &matcher, &options))
        )
    }

    async fn find(
        &self,
        entity: &str,
        filter: FilterQuery,
        options: FindOptions,
    ) -> DriverResult<Vec<Document>> {
        log::debug!("find {} where {} with {:?}", entity, filter, options);

        let matcher = FilterMatcher::compile(&filter)?;
        let store = self.store.read().await;

        Ok(
            store
                .peek(entity)
                .map(|documents| executor::find_all(documents, &matcher, &options))
                .unwrap_or_default()
        )
    }

    async fn count(&self, entity: &str, filter: FilterQuery) -> DriverResult<usize> {
        log::debug!("count {} where {}", entity, filter);

        let matcher = FilterMatcher::compile(&filter)?;
        let store = self.store.read().await;

        Ok(
            store
                .peek(entity)
                .map_or(0, |documents| executor::count(documents, &matcher))
        )
    }

    async fn native_insert(&self, entity: &str, data: Document) -> DriverResult<QueryResult> {
        log::debug!("insert into {}: {}", entity, data);

        let metadata = self.config.metadata().get(entity)?;
        let mut store = self.store.write().await;

        InsertPipeline::new(metadata).insert(store.get(entity), data)
    }

    async fn native_insert_many(
        &self,
        entity: &str,
        _data: Vec<Document>,
    ) -> DriverResult<QueryResult> {
        log::debug!("rejected bulk insert into {}", entity);

        Err(DriverError::Unsupported("native_insert_many".to_string()))
    }

    async fn native_update(
        &self,
        entity: &str,
        filter: FilterQuery,
        data: Document,
    ) -> DriverResult<QueryResult> {
        log::debug!("update {} where {} with {}", entity, filter, data);

        let metadata = self.config.metadata().get(entity)?;
        let matcher = FilterMatcher::compile(&filter)?;
        let mut store = self.store.write().await;

        Ok(executor::update_matching(store.get(entity), &matcher, &data, metadata))
    }

    async fn native_delete(&self, entity: &str, filter: FilterQuery) -> DriverResult<QueryResult> {
        log::debug!("delete from {} where {}", entity, filter);

        let metadata = self.config.metadata().get(entity)?;
        let matcher = FilterMatcher::compile(&filter)?;
        let mut store = self.store.write().await;

        let documents = std::mem::take(store.get(entity));
        let (kept, result) = executor::delete_matching(documents, &matcher, metadata);
        store.replace(entity, kept);

        Ok(result)
    }

    fn connection(&self) -> &dyn Connection {
        self.connection.as_ref()
    }

    fn schema_generator(&self) -> Box<dyn SchemaGenerator + '_> {
        Box::new(InMemorySchemaGenerator::new(self.store.clone()))
    }

    fn metadata(&self) -> &MetadataStorage {
        self.config.metadata()
    }
}

/// Builder for constructing [`InMemoryDriver`] instances.
///
/// # Example
///
/// ```ignore
/// use ormem_memory::InMemoryDriver;
/// use ormem_core::driver::DriverBuilder;
///
/// #[tokio::main]
/// async fn main() {
///     let driver = InMemoryDriver::builder(config).build().await.unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct InMemoryDriverBuilder {
    config: Configuration,
}

impl InMemoryDriverBuilder {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverBuilder for InMemoryDriverBuilder {
    type Driver = InMemoryDriver;

    /// Builds a driver with an empty store. This always succeeds.
    async fn build(self) -> DriverResult<Self::Driver> {
        log::debug!("building in-memory driver for database {}", self.config.db_name());

        Ok(InMemoryDriver::new(self.config))
    }
}
