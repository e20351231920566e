//! Connection stub of the in-memory driver.
//!
//! There is no server to talk to: connecting and closing always succeed, and
//! transactions are handles without isolation or rollback.

use async_trait::async_trait;
use bson::Document;
use std::sync::atomic::{AtomicU64, Ordering};

use ormem_core::{
    config::Configuration,
    connection::{Connection, Transaction},
    error::{DriverError, DriverResult},
};

#[derive(Debug)]
pub struct InMemoryConnection {
    client_url: String,
    next_transaction: AtomicU64,
}

impl InMemoryConnection {
    /// Creates a connection for `config`.
    ///
    /// The client URL is the configured one, or `memory://<db_name>`.
    pub fn new(config: &Configuration) -> Self {
        let client_url = config
            .client_url()
            .map(str::to_string)
            .unwrap_or_else(|| format!("memory://{}", config.db_name()));

        Self {
            client_url,
            next_transaction: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    async fn connect(&self) -> DriverResult<()> {
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn close(&self, _force: bool) -> DriverResult<()> {
        Ok(())
    }

    fn client_url(&self) -> String {
        self.client_url.clone()
    }

    async fn execute(&self, _query: &str) -> DriverResult<Vec<Document>> {
        Err(DriverError::Unsupported("execute".to_string()))
    }

    async fn begin(&self) -> DriverResult<Transaction> {
        Ok(Transaction::new(self.next_transaction.fetch_add(1, Ordering::Relaxed)))
    }

    async fn commit(&self, transaction: Transaction) -> DriverResult<()> {
        log::trace!("commit of transaction {} is a no-op", transaction.id());
        Ok(())
    }

    async fn rollback(&self, transaction: Transaction) -> DriverResult<()> {
        log::trace!("rollback of transaction {} is a no-op", transaction.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Configuration {
        Configuration::builder()
            .db_name("test")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_client_url_defaults_to_memory_scheme() {
        let connection = InMemoryConnection::new(&config());

        assert_eq!(connection.client_url(), "memory://test");
        assert!(connection.is_connected().await);
    }

    #[tokio::test]
    async fn test_configured_client_url_wins() {
        let config = Configuration::builder()
            .db_name("test")
            .client_url("memory://custom")
            .build()
            .unwrap();

        assert_eq!(InMemoryConnection::new(&config).client_url(), "memory://custom");
    }

    #[tokio::test]
    async fn test_execute_is_unsupported() {
        let connection = InMemoryConnection::new(&config());

        assert!(connection.execute("SELECT 1").await.unwrap_err().is_unsupported());
    }

    #[tokio::test]
    async fn test_transactions_get_distinct_ids() {
        let connection = InMemoryConnection::new(&config());

        let first = connection.begin().await.unwrap();
        let second = connection.begin().await.unwrap();

        assert_ne!(first.id(), second.id());
        connection.commit(first).await.unwrap();
        connection.rollback(second).await.unwrap();
    }

    #[tokio::test]
    async fn test_transactional_runs_work_directly() {
        let connection = InMemoryConnection::new(&config());
        let connection: &dyn Connection = &connection;

        let value = connection
            .transactional(|_| async { Ok(42) })
            .await
            .unwrap();
        let err = connection
            .transactional(|_| async { Err::<(), _>(DriverError::InvalidQuery("boom".into())) })
            .await
            .unwrap_err();

        assert_eq!(value, 42);
        assert!(matches!(err, DriverError::InvalidQuery(_)));
    }
}
