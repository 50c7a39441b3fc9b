use std::fmt;

use thiserror::Error;

/// Required credential fields, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    KeyFile,
    Organization,
    Cluster,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::KeyFile => "key-file",
            RequiredField::Organization => "organization",
            RequiredField::Cluster => "cluster",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User input errors. Returned to the caller as a response, never treated
/// as a system failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No '{0}' set")]
    MissingField(RequiredField),
    #[error("ttl is not a scalar: {0}")]
    TtlNotScalar(&'static str),
    #[error("ttl is not an integer: {0}")]
    TtlNotInteger(String),
    #[error("ttl must not be negative: {0}")]
    TtlNegative(String),
    #[error("payload must be a JSON object")]
    PayloadNotObject,
    #[error("payload is not valid JSON: {0}")]
    MalformedPayload(String),
}
