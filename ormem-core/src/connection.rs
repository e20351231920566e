//! Connection lifecycle and transaction hooks.
//!
//! Drivers without a real server still expose a [`Connection`] so the ORM can go
//! through its usual connect/close and transaction boundaries.

use async_trait::async_trait;
use bson::Document;
use std::{fmt::Debug, future::Future};

use crate::error::DriverResult;

/// Handle of an open transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: u64,
}

impl Transaction {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
pub trait Connection: Send + Sync + Debug {
    /// Establishes the connection.
    async fn connect(&self) -> DriverResult<()>;

    /// Reports whether the connection is usable.
    async fn is_connected(&self) -> bool;

    /// Closes the connection. `force` skips waiting for pending work.
    async fn close(&self, force: bool) -> DriverResult<()>;

    /// The URL the connection points at.
    fn client_url(&self) -> String;

    /// Runs a raw native query.
    async fn execute(&self, query: &str) -> DriverResult<Vec<Document>>;

    /// Opens a transaction.
    async fn begin(&self) -> DriverResult<Transaction>;

    /// Commits a transaction.
    async fn commit(&self, transaction: Transaction) -> DriverResult<()>;

    /// Rolls a transaction back.
    async fn rollback(&self, transaction: Transaction) -> DriverResult<()>;
}

impl dyn Connection + '_ {
    /// Runs `work` inside a transaction.
    ///
    /// The transaction is committed when `work` succeeds and rolled back when it
    /// fails; the error of `work` is returned unchanged.
    pub async fn transactional<T, F, Fut>(&self, work: F) -> DriverResult<T>
    where
        F: FnOnce(Transaction) -> Fut,
        Fut: Future<Output = DriverResult<T>>,
    {
        let transaction = self.begin().await?;

        match work(transaction.clone()).await {
            Ok(value) => {
                self.commit(transaction).await?;
                Ok(value)
            }
            Err(err) => {
                self.rollback(transaction).await?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingConnection {
        events: Mutex<Vec<String>>,
    }

    impl RecordingConnection {
        fn record(&self, event: String) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().map(|events| events.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Connection for RecordingConnection {
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
            "recording://".to_string()
        }

        async fn execute(&self, _query: &str) -> DriverResult<Vec<Document>> {
            Ok(vec![])
        }

        async fn begin(&self) -> DriverResult<Transaction> {
            self.record("begin".to_string());
            Ok(Transaction::new(7))
        }

        async fn commit(&self, transaction: Transaction) -> DriverResult<()> {
            self.record(format!("commit {}", transaction.id()));
            Ok(())
        }

        async fn rollback(&self, transaction: Transaction) -> DriverResult<()> {
            self.record(format!("rollback {}", transaction.id()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_transactional_commits_on_success() {
        let recording = RecordingConnection::default();
        let connection: &dyn Connection = &recording;

        let id = connection
            .transactional(|transaction| async move { Ok(transaction.id()) })
            .await
            .unwrap();

        assert_eq!(id, 7);
        assert_eq!(recording.events(), vec!["begin".to_string(), "commit 7".to_string()]);
    }

    #[tokio::test]
    async fn test_transactional_rolls_back_on_error() {
        let recording = RecordingConnection::default();
        let connection: &dyn Connection = &recording;

        let err = connection
            .transactional(|_| async { Err::<(), _>(DriverError::Unsupported("work".into())) })
            .await
            .unwrap_err();

        assert!(err.is_unsupported());
        assert_eq!(recording.events(), vec!["begin".to_string(), "rollback 7".to_string()]);
    }
}
