//! The driver contract and ORM facade of the ormem project.
//!
//! This crate defines everything a storage driver needs to plug into the ORM:
//!
//! - **Driver traits** ([`driver`], [`connection`], [`schema`]) - The capability set a driver implements
//! - **Entity traits** ([`entity`]) - Mapping typed entities to documents
//! - **Entity metadata** ([`metadata`]) - Primary keys and property defaults
//! - **Query vocabulary** ([`query`]) - Filters, sort keys, pagination options and write results
//! - **ORM facade** ([`orm`], [`repository`]) - Entity managers and collection handles
//! - **Configuration** ([`config`]) - Database name, client URL and registered entities
//! - **Error handling** ([`error`]) - The error and result types
//! - **Pagination** ([`page`]) - Paged reads with total counts
//!
//! # Example
//!
//! ```ignore
//! use ormem::prelude::*;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Post {
//!     pub id: i32,
//!     pub title: String,
//! }
//!
//! impl Entity for Post {
//!     fn entity_name() -> &'static str {
//!         "Post"
//!     }
//!
//!     fn metadata() -> EntityMetadata {
//!         EntityMetadata::new(Self::entity_name()).primary_key("id")
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as ormem_core;

pub mod config;
pub mod connection;
pub mod driver;
pub mod entity;
pub mod error;
pub mod metadata;
pub mod orm;
pub mod page;
pub mod query;
pub mod repository;
pub mod schema;
