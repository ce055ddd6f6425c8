//! Read/write access to the `classes` collection.

use async_trait::async_trait;
use thiserror::Error;

use crate::document::DecodeError;
use crate::models::{ClassRecord, StudentEntry};

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreRepository;
pub use memory::MemoryRepository;

/// Failure of a single repository call, already classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Unknown(String),
}

impl RepositoryError {
    pub fn message(&self) -> &str {
        match self {
            RepositoryError::PermissionDenied(msg)
            | RepositoryError::Unavailable(msg)
            | RepositoryError::Unknown(msg) => msg,
        }
    }
}

impl From<DecodeError> for RepositoryError {
    fn from(value: DecodeError) -> Self {
        RepositoryError::Unknown(value.to_string())
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_connect() || value.is_timeout() {
            RepositoryError::Unavailable(value.to_string())
        } else {
            RepositoryError::Unknown(value.to_string())
        }
    }
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    /// Every document in the collection, in store order.
    async fn list_classes(&self) -> Result<Vec<ClassRecord>, RepositoryError>;
    /// Writes one new class and returns the id the store assigned.
    async fn create_class(
        &self,
        name: String,
        students: Vec<StudentEntry>,
    ) -> Result<String, RepositoryError>;
    async fn delete_class(&self, id: &str) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_is_unknown() {
        let err: RepositoryError = DecodeError::MissingField("name").into();
        assert!(matches!(err, RepositoryError::Unknown(_)));
        assert_eq!(err.message(), "document field `name` is missing");
    }
}
