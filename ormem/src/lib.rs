//! Main ormem crate: an ORM facade with an in-memory storage driver.
//!
//! This crate is the primary entry point for users of ormem. It re-exports the
//! driver contract and ORM facade from `ormem-core` and the in-memory driver from
//! `ormem-memory`.
//!
//! # Features
//!
//! - **Typed entities** - Define entities with Serde and describe their keys and defaults with metadata
//! - **Pluggable drivers** - The ORM runs against any `Driver`; the in-memory one needs no database
//! - **Query-by-example filters** - Composable filters including SQL wildcard patterns
//! - **Sessions** - Entity managers that fork cheaply and share the driver's data
//!
//! # Quick Start
//!
//! ```ignore
//! use ormem::{prelude::*, memory::InMemoryDriver};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct TestEntity {
//!     pub id: i32,
//!     pub value: String,
//! }
//!
//! impl Entity for TestEntity {
//!     fn entity_name() -> &'static str { "TestEntity" }
//!
//!     fn metadata() -> EntityMetadata {
//!         EntityMetadata::new(Self::entity_name())
//!             .primary_key("id")
//!             .property(EntityProperty::new("value"))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> DriverResult<()> {
//!     let config = Configuration::builder()
//!         .db_name("test")
//!         .entity::<TestEntity>()
//!         .build()?;
//!     let orm = Orm::init(InMemoryDriver::builder(config)).await?;
//!     orm.schema_generator().clear_database().await?;
//!
//!     orm.em().fork().insert(&TestEntity { id: 1, value: "test".into() }).await?;
//!
//!     let found = orm.em()
//!         .fork()
//!         .find_one::<TestEntity>(Filter::eq("id", 1))
//!         .await?;
//!
//!     println!("Found: {:?}", found);
//!
//!     orm.close(false).await
//! }
//! ```
//!
//! # Drivers
//!
//! - [`memory`] - Process-local storage for tests

pub mod prelude;

pub use ormem_core::{config, connection, driver, entity, error, metadata, orm, page, query, repository, schema};

// Re-export BSON types for convenience
pub use bson;

/// In-memory driver implementations.
pub mod memory {
    pub use ormem_memory::{InMemoryDriver, InMemoryDriverBuilder, InMemoryConnection, InMemorySchemaGenerator};
}
