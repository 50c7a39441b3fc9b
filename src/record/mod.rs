//! Credential record stored per secret path: service-account material,
//! target identifiers and the optional token cache.

pub mod credential;
pub mod ttl;
pub mod validation;

pub use credential::{CredentialRecord, ValidatedRecord};
pub use ttl::coerce_ttl;
pub use validation::{RequiredField, ValidationError};
