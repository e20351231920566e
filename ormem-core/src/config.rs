//! Driver configuration.
//!
//! A [`Configuration`] carries the database name, an optional client URL and the
//! metadata of every entity the driver will be asked about. Build one with
//! [`Configuration::builder`]:
//!
//! ```ignore
//! use ormem::prelude::*;
//!
//! let config = Configuration::builder()
//!     .db_name("test")
//!     .entity::<Post>()
//!     .build()?;
//! ```

use crate::{
    entity::Entity,
    error::{DriverError, DriverResult},
    metadata::{EntityMetadata, MetadataStorage},
};

#[derive(Debug, Clone)]
pub struct Configuration {
    db_name: String,
    client_url: Option<String>,
    metadata: MetadataStorage,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Name of the database the driver serves.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Client URL, if one was configured.
    pub fn client_url(&self) -> Option<&str> {
        self.client_url.as_deref()
    }

    /// Metadata of every registered entity.
    pub fn metadata(&self) -> &MetadataStorage {
        &self.metadata
    }
}

#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    db_name: Option<String>,
    client_url: Option<String>,
    entities: Vec<EntityMetadata>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the database name.
    pub fn db_name(mut self, db_name: impl Into<String>) -> Self {
        self.db_name = Some(db_name.into());
        self
    }

    /// Sets the client URL reported by the connection.
    pub fn client_url(mut self, client_url: impl Into<String>) -> Self {
        self.client_url = Some(client_url.into());
        self
    }

    /// Registers a typed entity.
    pub fn entity<E: Entity>(mut self) -> Self {
        self.entities.push(E::metadata());
        self
    }

    /// Registers raw entity metadata.
    pub fn metadata(mut self, metadata: EntityMetadata) -> Self {
        self.entities.push(metadata);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Initialization`] if no database name was set or an
    /// entity is registered twice.
    pub fn build(self) -> DriverResult<Configuration> {
        let db_name = self.db_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| DriverError::Initialization("db_name is required".to_string()))?;

        let mut metadata = MetadataStorage::new();

        for entity in self.entities {
            if metadata.find(&entity.name).is_some() {
                return Err(DriverError::Initialization(format!(
                    "entity {} is registered twice",
                    entity.name,
                )));
            }
            metadata.register(entity);
        }

        Ok(Configuration {
            db_name,
            client_url: self.client_url,
            metadata,
        })
    }
}
