use serde::Deserialize;

use crate::config::issuer::IssuerConfig;
use crate::config::settings::SettingsConfig;
use crate::config::storage::StorageConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub issuer: IssuerConfig,
}
