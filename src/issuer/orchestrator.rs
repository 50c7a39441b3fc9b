use std::path::PathBuf;

use tracing::debug;

use crate::cache::policy;
use crate::config::issuer::IssuerConfig;
use crate::errors::BrokerError;
use crate::issuer::command::CommandRunner;
use crate::issuer::key_file::KeyFile;
use crate::issuer::snctl::SnctlIssuer;
use crate::record::{CredentialRecord, ValidatedRecord};

/// Outcome of [`Orchestrator::obtain_token`].
#[derive(Debug, Clone, PartialEq)]
pub struct Issued {
    pub token: String,
    /// Record carrying the refreshed cache. `None` on a cache hit or when
    /// the record has no ttl; nothing needs persisting then.
    pub updated: Option<CredentialRecord>,
    pub cache_hit: bool,
}

/// Produces a usable token for a validated record, from cache when possible.
#[derive(Debug)]
pub struct Orchestrator<R> {
    issuer: SnctlIssuer<R>,
    temp_dir: PathBuf,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R, config: &IssuerConfig) -> Self {
        Self {
            issuer: SnctlIssuer::new(runner, config),
            temp_dir: config.resolve_temp_dir(),
        }
    }

    pub fn issuer(&self) -> &SnctlIssuer<R> {
        &self.issuer
    }

    /// Cached token if still valid at `now_millis`, otherwise a fresh one.
    ///
    /// Every failure is returned as is; nothing is retried. The temporary
    /// key file is gone once this returns or is dropped.
    pub async fn obtain_token(
        &self,
        validated: &ValidatedRecord<'_>,
        path: &str,
        now_millis: i64,
    ) -> Result<Issued, BrokerError> {
        let record = validated.record;
        if let Some(token) = policy::cached_token(record, now_millis) {
            debug!(path, "token cache hit");
            return Ok(Issued { token: token.to_owned(), updated: None, cache_hit: true });
        }

        debug!(path, "reading new token");
        self.issuer
            .ensure_environment()
            .await
            .map_err(BrokerError::Environment)?;

        let key_file = KeyFile::materialize(&self.temp_dir, &validated.key_file)
            .await
            .map_err(BrokerError::KeyMaterial)?;

        self.issuer
            .activate_service_account(key_file.path())
            .await
            .map_err(BrokerError::Activation)?;

        let token = self
            .issuer
            .get_token(&validated.organization, &validated.cluster, key_file.path())
            .await
            .map_err(BrokerError::Issuance)?;
        drop(key_file);

        let updated = record
            .ttl_seconds
            .map(|_| policy::refresh(record, now_millis, &token));
        Ok(Issued { token, updated, cache_hit: false })
    }
}
