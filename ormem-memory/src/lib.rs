//! In-memory storage driver for ormem.
//!
//! This crate provides an implementation of the `Driver` trait that keeps every
//! collection in process memory. It is meant for tests: entities go through the
//! same ORM calls as with a real database, without any network I/O.
//!
//! # Features
//!
//! - **Query-by-example filters** - Equality, comparison, membership, existence, regex and logical operators
//! - **SQL wildcard patterns** - `$like` / `$ilike` are translated into anchored regular expressions
//! - **Sorting and pagination** - Stable multi-key sort, then offset, then limit
//! - **Primary-key uniqueness** - Checked on insert
//! - **Timestamp defaults** - `current_timestamp` properties are filled on insert
//!
//! # Quick Start
//!
//! ```ignore
//! use ormem::prelude::*;
//! use ormem_memory::InMemoryDriver;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Post {
//!     pub id: i32,
//!     pub title: String,
//! }
//!
//! impl Entity for Post {
//!     fn entity_name() -> &'static str { "Post" }
//!     fn metadata() -> EntityMetadata { EntityMetadata::new("Post").primary_key("id") }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Configuration::builder().db_name("test").entity::<Post>().build()?;
//!     let orm = Orm::init(InMemoryDriver::builder(config)).await?;
//!
//!     orm.em().insert(&Post { id: 1, title: "Hello".into() }).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as ormem_memory;

pub mod connection;
pub mod driver;
pub mod evaluator;
pub mod executor;
pub mod expr;
pub mod insert;
pub mod schema;
pub mod store;
pub mod translate;

pub use connection::InMemoryConnection;
pub use driver::{InMemoryDriver, InMemoryDriverBuilder};
pub use evaluator::FilterMatcher;
pub use schema::InMemorySchemaGenerator;
pub use store::DocumentStore;
