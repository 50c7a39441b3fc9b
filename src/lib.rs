//! # snctl token agent
//!
//! Issues short-lived StreamNative tokens for secret paths backed by a stored
//! service-account key, caching each token on its record for the record's ttl.
//!
//! Modules:
//! - `record`: credential record shape, validation and ttl coercion
//! - `cache`: cache validity and refresh decisions
//! - `issuer`: `snctl` invocation and the issuance orchestrator
//! - `storage`: key/value storage backends
//! - `handler`: read/write/delete/exists over secret paths
//! - `server`: HTTP surface for the path operations

pub mod cache;
pub mod config;
pub mod errors;
pub mod handler;
pub mod helpers;
pub mod issuer;
pub mod observability;
pub mod record;
pub mod server;
pub mod storage;
#[cfg(test)]
pub mod tests;
pub mod utils;

pub use crate::config::types::ServiceConfig;
pub use crate::errors::BrokerError;
pub use crate::handler::{Response, SecretBackend};
pub use crate::record::{CredentialRecord, ValidationError};
