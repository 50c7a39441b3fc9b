//! Secret path operations: read issues tokens, write stores credential
//! records, delete removes them.

pub mod backend;
pub mod response;

pub use backend::SecretBackend;
pub use response::Response;
