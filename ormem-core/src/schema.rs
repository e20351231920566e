//! Schema management hooks used by test setup and teardown.

use async_trait::async_trait;

use crate::error::DriverResult;

/// Schema operations a driver exposes to the ORM.
///
/// Schemaless drivers implement the create/drop/update operations as no-ops;
/// [`SchemaGenerator::clear_database`] is the one operation expected to act, by
/// removing every stored document.
#[async_trait]
pub trait SchemaGenerator: Send + Sync {
    /// Makes sure the database exists. Returns `true` when it is ready.
    async fn ensure_database(&self) -> DriverResult<bool>;

    async fn create_schema(&self) -> DriverResult<()>;

    async fn drop_schema(&self) -> DriverResult<()>;

    async fn update_schema(&self) -> DriverResult<()>;

    /// Drops and recreates the schema.
    async fn refresh_database(&self) -> DriverResult<()> {
        self.drop_schema().await?;
        self.create_schema().await
    }

    /// Removes all data while keeping the schema.
    async fn clear_database(&self) -> DriverResult<()>;
}
