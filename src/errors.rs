//! Failure taxonomy of the issuance core. User input errors live in
//! [`crate::record::ValidationError`] and are returned as responses instead.

use thiserror::Error;

use crate::issuer::command::CommandError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("{operation} failed for '{path}': {source}")]
    Storage {
        operation: StorageOperation,
        path: String,
        #[source]
        source: StorageError,
    },
    #[error("record encoding failed for '{path}': {source}")]
    Encoding {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("initializing issuer config failed: {0}")]
    Environment(#[source] EnvironmentError),
    #[error("writing temporary key file failed: {0}")]
    KeyMaterial(#[source] std::io::Error),
    #[error("activating service account failed: {0}")]
    Activation(#[source] CommandError),
    #[error("issuing token failed: {0}")]
    Issuance(#[source] CommandError),
}

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("no user HOME directory to locate the issuer config")]
    NoHomeDirectory,
    #[error(transparent)]
    Command(#[from] CommandError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Get,
    Put,
    Delete,
}

impl StorageOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageOperation::Get => "reading from storage",
            StorageOperation::Put => "putting to storage",
            StorageOperation::Delete => "deleting from storage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageOperation::Get => "get",
            StorageOperation::Put => "put",
            StorageOperation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BrokerError {
    pub fn storage(operation: StorageOperation, path: &str, source: StorageError) -> Self {
        BrokerError::Storage { operation, path: path.to_owned(), source }
    }

    pub fn encoding(path: &str, source: serde_json::Error) -> Self {
        BrokerError::Encoding { path: path.to_owned(), source }
    }
}
