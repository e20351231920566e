//! Error types and result types for driver operations.
//!
//! Every fallible operation in the workspace returns [`DriverResult<T>`]. A missing
//! document on a single read is not an error; it is reported as `Ok(None)`.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when talking to a driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during driver initialization or configuration.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the same primary key already exists.
    /// The first argument is the rendered key, the second is the collection name.
    #[error("Duplicate key {0} in collection {1}")]
    DuplicateKey(String, String),
    /// No entity metadata is registered under the given name.
    #[error("Metadata not found for entity: {0}")]
    MetadataNotFound(String),
    /// The filter uses an operator or operand the engine cannot evaluate.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// The value handed to the driver is not a document.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The driver does not implement the requested operation.
    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

/// A specialized `Result` type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

impl DriverError {
    /// Returns `true` if this error reports a primary-key collision.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, DriverError::DuplicateKey(..))
    }

    /// Returns `true` if this error reports an unimplemented operation.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DriverError::Unsupported(_))
    }
}

impl From<BsonError> for DriverError {
    fn from(err: BsonError) -> Self {
        DriverError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DriverError {
    fn from(err: SerdeJsonError) -> Self {
        DriverError::Serialization(err.to_string())
    }
}
