use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::token::CachedToken;
use crate::record::ttl::coerce_ttl;
use crate::record::validation::{RequiredField, ValidationError};

pub const FIELD_KEY_FILE: &str = "key-file";
pub const FIELD_ORGANIZATION: &str = "organization";
pub const FIELD_CLUSTER: &str = "cluster";
pub const FIELD_TTL: &str = "ttl";
pub const FIELD_CACHED_TOKEN: &str = "cachedToken";
pub const FIELD_CACHED_AT: &str = "cachedAt";

/// Credential record persisted under one secret path.
///
/// `ttl_seconds == None` means tokens are never cached. The cache pair is
/// owned by the issuance orchestrator and is only ever set as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRecord", into = "StoredRecord")]
pub struct CredentialRecord {
    pub key_file: Option<Value>,
    pub organization: Option<Value>,
    pub cluster: Option<Value>,
    pub ttl_seconds: Option<u64>,
    pub cache: Option<CachedToken>,
    /// Caller supplied fields this service does not interpret. Kept as is.
    pub extra: Map<String, Value>,
}

/// Credential fields borrowed from a record that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRecord<'a> {
    pub record: &'a CredentialRecord,
    pub key_file: Cow<'a, str>,
    pub organization: Cow<'a, str>,
    pub cluster: Cow<'a, str>,
}

impl CredentialRecord {
    pub fn new(key_file: &str, organization: &str, cluster: &str, ttl_seconds: Option<u64>) -> Self {
        Self {
            key_file: Some(Value::String(key_file.to_owned())),
            organization: Some(Value::String(organization.to_owned())),
            cluster: Some(Value::String(cluster.to_owned())),
            ttl_seconds,
            cache: None,
            extra: Map::new(),
        }
    }

    /// Build a record from a loosely typed write payload.
    ///
    /// `ttl` is coerced to whole seconds. Cache fields supplied by the caller
    /// are only kept when both are present, well formed and a ttl is set.
    pub fn from_payload(mut payload: Map<String, Value>) -> Result<Self, ValidationError> {
        let ttl_seconds = payload
            .remove(FIELD_TTL)
            .map(|raw| coerce_ttl(&raw))
            .transpose()?;

        let cached_token = payload.remove(FIELD_CACHED_TOKEN);
        let cached_at = payload.remove(FIELD_CACHED_AT);
        let cache = match (cached_token, cached_at) {
            (Some(Value::String(token)), Some(at)) => at
                .as_i64()
                .map(|cached_at_millis| CachedToken::new(token, cached_at_millis)),
            _ => None,
        }
        .filter(|_| ttl_seconds.is_some());

        Ok(Self {
            key_file: take_non_null(&mut payload, FIELD_KEY_FILE),
            organization: take_non_null(&mut payload, FIELD_ORGANIZATION),
            cluster: take_non_null(&mut payload, FIELD_CLUSTER),
            ttl_seconds,
            cache,
            extra: payload,
        })
    }

    /// Check required fields in the fixed order key-file, organization,
    /// cluster. The first missing one is reported.
    pub fn validate(&self) -> Result<ValidatedRecord<'_>, ValidationError> {
        let key_file = self.required(RequiredField::KeyFile)?;
        let organization = self.required(RequiredField::Organization)?;
        let cluster = self.required(RequiredField::Cluster)?;
        Ok(ValidatedRecord {
            record: self,
            key_file,
            organization,
            cluster,
        })
    }

    fn required(&self, field: RequiredField) -> Result<Cow<'_, str>, ValidationError> {
        let value = match field {
            RequiredField::KeyFile => &self.key_file,
            RequiredField::Organization => &self.organization,
            RequiredField::Cluster => &self.cluster,
        };
        value
            .as_ref()
            .filter(|v| !v.is_null())
            .map(value_text)
            .ok_or(ValidationError::MissingField(field))
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

fn take_non_null(payload: &mut Map<String, Value>, key: &str) -> Option<Value> {
    payload.remove(key).filter(|v| !v.is_null())
}

/// Strings are used verbatim, other values as compact JSON text
/// (e.g. an inline service-account key document).
fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// On-disk shape of a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredRecord {
    #[serde(rename = "key-file", default, skip_serializing_if = "Option::is_none")]
    key_file: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cluster: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl: Option<u64>,
    #[serde(rename = "cachedToken", default, skip_serializing_if = "Option::is_none")]
    cached_token: Option<String>,
    #[serde(rename = "cachedAt", default, skip_serializing_if = "Option::is_none")]
    cached_at: Option<i64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<StoredRecord> for CredentialRecord {
    fn from(stored: StoredRecord) -> Self {
        // a lone half of the cache pair is ignored, as is any cache without a ttl
        let cache = match (stored.ttl, stored.cached_token, stored.cached_at) {
            (Some(_), Some(token), Some(at)) => Some(CachedToken::new(token, at)),
            _ => None,
        };
        Self {
            key_file: stored.key_file,
            organization: stored.organization,
            cluster: stored.cluster,
            ttl_seconds: stored.ttl,
            cache,
            extra: stored.extra,
        }
    }
}

impl From<CredentialRecord> for StoredRecord {
    fn from(record: CredentialRecord) -> Self {
        let (cached_token, cached_at) = match record.cache {
            Some(cache) => (Some(cache.token), Some(cache.cached_at_millis)),
            None => (None, None),
        };
        Self {
            key_file: record.key_file,
            organization: record.organization,
            cluster: record.cluster,
            ttl: record.ttl_seconds,
            cached_token,
            cached_at,
            extra: record.extra,
        }
    }
}
