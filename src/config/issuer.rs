use std::env;
use std::path::PathBuf;

use serde::Deserialize;

pub const SNCTL_PATH_ENV: &str = "SNCTL_PATH";
pub const SNCTL_DEFAULT_PROGRAM: &str = "snctl";
pub const SNCTL_CONFIG_DIR_NAME: &str = ".snctl";

/// ================================
/// External issuer (snctl)
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IssuerConfig {
    /// Executable; falls back to `$SNCTL_PATH`, then `snctl` on PATH.
    pub path: Option<String>,
    /// Directory whose presence means `snctl config init` already ran.
    /// Defaults to `$HOME/.snctl`.
    pub config_dir: Option<String>,
    /// Where transient key files are written. Defaults to the system temp dir.
    pub temp_dir: Option<String>,
}

impl IssuerConfig {
    pub fn resolve_program(&self) -> String {
        self.path
            .as_ref()
            .filter(|p| !p.is_empty())
            .cloned()
            .or_else(|| env::var(SNCTL_PATH_ENV).ok().filter(|p| !p.is_empty()))
            .unwrap_or_else(|| SNCTL_DEFAULT_PROGRAM.to_owned())
    }

    pub fn resolve_config_dir(&self) -> Option<PathBuf> {
        self.config_dir
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                env::var_os("HOME")
                    .filter(|home| !home.is_empty())
                    .map(|home| PathBuf::from(home).join(SNCTL_CONFIG_DIR_NAME))
            })
    }

    pub fn resolve_temp_dir(&self) -> PathBuf {
        self.temp_dir
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir)
    }
}
