//! Configuration validation with aggregated errors.
//! - server host/port
//! - mount point and metrics path shape
//! - logging level
//! - storage backend requirements

use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::storage::{StorageConfig, StorageType};
use crate::config::types::ServiceConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_storage(&cfg.storage, &mut errors);

    if let Some(path) = &cfg.issuer.path {
        if path.trim().is_empty() {
            errors.push("issuer.path must not be blank when set".to_string());
        }
    }

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            settings.server.port
        ));
    }

    let mount = &settings.mount_point;
    if mount.is_empty() || !mount.ends_with('/') || mount.starts_with('/') {
        errors.push(format!(
            "settings.mount_point '{}' must be non-empty, relative and end with '/'",
            mount
        ));
    }

    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_storage(storage: &StorageConfig, errors: &mut Vec<String>) {
    match storage.storage_type {
        StorageType::Memory => {}
        StorageType::File => match &storage.path {
            Some(path) if !path.trim().is_empty() => {}
            _ => errors.push("storage.path is required for type 'file'".to_string()),
        },
    }
}
