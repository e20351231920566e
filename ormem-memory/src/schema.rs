//! Schema generator of the in-memory driver.
//!
//! Collections are schemaless and created on first use, so only
//! [`SchemaGenerator::clear_database`] does any work.

use async_trait::async_trait;
use mea::rwlock::RwLock;
use std::sync::Arc;

use ormem_core::{error::DriverResult, schema::SchemaGenerator};

use crate::store::DocumentStore;

pub struct InMemorySchemaGenerator {
    store: Arc<RwLock<DocumentStore>>,
}

impl InMemorySchemaGenerator {
    pub fn new(store: Arc<RwLock<DocumentStore>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SchemaGenerator for InMemorySchemaGenerator {
    async fn ensure_database(&self) -> DriverResult<bool> {
        Ok(true)
    }

    async fn create_schema(&self) -> DriverResult<()> {
        Ok(())
    }

    async fn drop_schema(&self) -> DriverResult<()> {
        Ok(())
    }

    async fn update_schema(&self) -> DriverResult<()> {
        Ok(())
    }

    async fn refresh_database(&self) -> DriverResult<()> {
        Ok(())
    }

    async fn clear_database(&self) -> DriverResult<()> {
        let mut store = self.store.write().await;
        let removed = store.len();

        store.clear();
        log::info!("Cleared {} documents from {} collections", removed, store.collection_names().len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn test_clear_database_empties_store() {
        let store = Arc::new(RwLock::new(DocumentStore::new()));
        store.write().await.get("Post").push(doc! { "id": 1 });

        let generator = InMemorySchemaGenerator::new(store.clone());
        assert!(generator.ensure_database().await.unwrap());
        generator.refresh_database().await.unwrap();
        assert_eq!(store.read().await.len(), 1);

        generator.clear_database().await.unwrap();

        assert!(store.read().await.is_empty());
        assert_eq!(store.read().await.collection_names(), vec!["Post".to_string()]);
    }
}
