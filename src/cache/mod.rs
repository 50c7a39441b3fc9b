//! Token cache policy: pure decisions over a record and the current time.

pub mod policy;
pub mod token;
