use serde::Deserialize;

/// ================================
/// Secret storage
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// Directory for `file` storage.
    pub path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { storage_type: StorageType::Memory, path: None }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Memory,
    File,
}
