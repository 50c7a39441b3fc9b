//! Key/value secret storage the credential records live in.

pub mod file;
pub mod memory;

use std::future::Future;

use thiserror::Error;
use tracing::info;

use crate::config::storage::{StorageConfig, StorageType};

use file::FileStorage;
use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Per-key get/put/delete of opaque bytes. Implementations provide per-key
/// atomicity; nothing above them takes locks.
pub trait SecretStorage: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    /// Full overwrite.
    fn put(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removing an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, StorageError>> + Send {
        async move {
            let value = self.get(key).await?;
            Ok::<bool, StorageError>(value.is_some())
        }
    }
}

/// Storage selected by configuration.
#[derive(Debug, Clone)]
pub enum StorageKind {
    Memory(MemoryStorage),
    File(FileStorage),
}

impl StorageKind {
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config.storage_type {
            StorageType::Memory => {
                info!("using in-memory storage, records are lost on restart");
                Ok(StorageKind::Memory(MemoryStorage::new()))
            }
            StorageType::File => {
                let path = config
                    .path
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| StorageError::Unavailable("storage.path is not set".to_owned()))?;
                info!("using file storage at {}", path);
                Ok(StorageKind::File(FileStorage::open(path).await?))
            }
        }
    }
}

impl SecretStorage for StorageKind {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match self {
            StorageKind::Memory(s) => s.get(key).await,
            StorageKind::File(s) => s.get(key).await,
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        match self {
            StorageKind::Memory(s) => s.put(key, value).await,
            StorageKind::File(s) => s.put(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self {
            StorageKind::Memory(s) => s.delete(key).await,
            StorageKind::File(s) => s.delete(key).await,
        }
    }
}
