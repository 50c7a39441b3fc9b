use serde::Serialize;

use crate::record::ValidationError;

/// Result of a path operation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Read succeeded.
    Token(String),
    /// Nothing stored at the path. A normal negative result.
    NoValue(String),
    /// Caller input was rejected.
    Invalid(ValidationError),
    /// Write or delete applied.
    Done,
}

impl Response {
    pub fn token(&self) -> Option<&str> {
        match self {
            Response::Token(token) => Some(token),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenBody<'a> {
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub errors: Vec<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { errors: vec![message.into()] }
    }
}
