use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::errors::{BrokerError, StorageOperation};
use crate::handler::response::Response;
use crate::helpers::time::now_millis;
use crate::issuer::command::CommandRunner;
use crate::issuer::orchestrator::Orchestrator;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::record::CredentialRecord;
use crate::storage::{SecretStorage, StorageError};

static CACHE_HIT_MSG: &'static str = "cache_hit";
static ISSUED_MSG: &'static str = "issued";
static NO_VALUE_MSG: &'static str = "no_value";
static INVALID_MSG: &'static str = "invalid";
static ERROR_MSG: &'static str = "error";

/// Binds path operations to storage and the issuance orchestrator.
///
/// No locking across calls: two reads of one expired path may both issue
/// and both persist, the last write wins.
#[derive(Debug)]
pub struct SecretBackend<S, R> {
    storage: S,
    orchestrator: Orchestrator<R>,
    mount_point: String,
}

impl<S: SecretStorage, R: CommandRunner> SecretBackend<S, R> {
    pub fn new(storage: S, orchestrator: Orchestrator<R>, mount_point: impl Into<String>) -> Self {
        Self { storage, orchestrator, mount_point: mount_point.into() }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether a record is stored at `path`. Read only.
    pub async fn exists(&self, path: &str) -> Result<bool, BrokerError> {
        let metrics = get_metrics().await;
        self.storage
            .exists(path)
            .await
            .map_err(|e| storage_failure(metrics, StorageOperation::Get, path, e))
    }

    /// Store the payload as the record at `path`, replacing whatever was
    /// there including its cache. An empty payload clears the path.
    pub async fn write(&self, path: &str, payload: Map<String, Value>) -> Result<Response, BrokerError> {
        let metrics = get_metrics().await;
        if payload.is_empty() {
            info!(path, "Clearing service account");
            self.delete_record(path).await?;
            metrics.path_writes.with_label_values(&["clear"]).inc();
            return Ok(Response::Done);
        }

        let record = match CredentialRecord::from_payload(payload) {
            Ok(record) => record,
            Err(invalid) => {
                debug!(path, "rejected write: {}", invalid);
                metrics.path_writes.with_label_values(&[INVALID_MSG]).inc();
                return Ok(Response::Invalid(invalid));
            }
        };

        info!(path, "Saving service account");
        self.put_record(path, &record).await?;
        metrics.path_writes.with_label_values(&["store"]).inc();
        Ok(Response::Done)
    }

    pub async fn read(&self, path: &str) -> Result<Response, BrokerError> {
        self.read_at(path, now_millis()).await
    }

    /// Read with an explicit clock, milliseconds since the UNIX epoch.
    pub async fn read_at(&self, path: &str, now_millis: i64) -> Result<Response, BrokerError> {
        let metrics = get_metrics().await;

        let record = match self.load_record(path).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                metrics.token_requests.with_label_values(&[NO_VALUE_MSG]).inc();
                return Ok(Response::NoValue(format!("No value at {}{}", self.mount_point, path)));
            }
            Err(e) => {
                metrics.token_requests.with_label_values(&[ERROR_MSG]).inc();
                return Err(e);
            }
        };

        let validated = match record.validate() {
            Ok(validated) => validated,
            Err(invalid) => {
                metrics.token_requests.with_label_values(&[INVALID_MSG]).inc();
                return Ok(Response::Invalid(invalid));
            }
        };

        let issued = self
            .orchestrator
            .obtain_token(&validated, path, now_millis)
            .await
            .inspect_err(|e| {
                error!(path, "obtaining token failed: {}", e);
                metrics.token_requests.with_label_values(&[ERROR_MSG]).inc();
            })?;

        if let Some(updated) = &issued.updated {
            // non-fatal, the token is already issued
            match self.put_record(path, updated).await {
                Ok(()) => debug!(path, "Token cache saved"),
                Err(e) => {
                    error!(path, "Saving token cache failed: {}", e);
                    metrics.cache_persist_failures.inc();
                }
            }
        }

        let outcome = if issued.cache_hit { CACHE_HIT_MSG } else { ISSUED_MSG };
        metrics.token_requests.with_label_values(&[outcome]).inc();
        Ok(Response::Token(issued.token))
    }

    /// Remove the record at `path`; a missing record is fine.
    pub async fn delete(&self, path: &str) -> Result<Response, BrokerError> {
        self.delete_record(path).await?;
        get_metrics().await.path_deletes.inc();
        Ok(Response::Done)
    }

    async fn load_record(&self, path: &str) -> Result<Option<CredentialRecord>, BrokerError> {
        let metrics = get_metrics().await;
        let bytes = self
            .storage
            .get(path)
            .await
            .map_err(|e| storage_failure(metrics, StorageOperation::Get, path, e))?;
        bytes
            .map(|bytes| {
                CredentialRecord::from_bytes(&bytes).map_err(|e| {
                    error!(path, "JSON decoding failed: {}", e);
                    BrokerError::encoding(path, e)
                })
            })
            .transpose()
    }

    async fn put_record(&self, path: &str, record: &CredentialRecord) -> Result<(), BrokerError> {
        let metrics = get_metrics().await;
        let bytes = record.to_bytes().map_err(|e| {
            error!(path, "JSON encoding failed: {}", e);
            BrokerError::encoding(path, e)
        })?;
        self.storage
            .put(path, bytes)
            .await
            .map_err(|e| storage_failure(metrics, StorageOperation::Put, path, e))
    }

    async fn delete_record(&self, path: &str) -> Result<(), BrokerError> {
        let metrics = get_metrics().await;
        self.storage
            .delete(path)
            .await
            .map_err(|e| storage_failure(metrics, StorageOperation::Delete, path, e))
    }
}

fn storage_failure(metrics: &Metrics, operation: StorageOperation, path: &str, source: StorageError) -> BrokerError {
    error!(path, "{} failed: {}", operation, source);
    metrics.storage_failures.with_label_values(&[operation.label()]).inc();
    BrokerError::storage(operation, path, source)
}
