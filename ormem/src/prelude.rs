//! Convenient re-exports of commonly used types from ormem.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use ormem::prelude::*;
//! ```
//!
//! This provides access to:
//! - Entity traits and metadata
//! - Driver traits and builders
//! - Filters and find options
//! - The ORM facade and repositories
//! - Error types

pub use ormem_core::{
    config::{Configuration, ConfigurationBuilder},
    connection::{Connection, Transaction},
    driver::{Driver, DriverBuilder},
    entity::{Entity, EntityExt},
    error::{DriverError, DriverResult},
    metadata::{DefaultRule, EntityMetadata, EntityProperty, MetadataStorage},
    orm::{EntityManager, Orm},
    page::{Page, PaginationParams},
    query::{Filter, FilterQuery, FindOptions, OrderBy, QueryResult, SortDirection},
    repository::{Collection, Repository},
    schema::SchemaGenerator,
};
