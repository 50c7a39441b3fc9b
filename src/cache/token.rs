/// Token cached on a record together with its issuance time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    pub cached_at_millis: i64, // UNIX TIMESTAMP, milliseconds
}

impl CachedToken {
    pub fn new(token: String, cached_at_millis: i64) -> Self {
        Self { token, cached_at_millis }
    }

    /// First instant (ms) at which the token is no longer served.
    pub fn expires_at_millis(&self, ttl_seconds: u64) -> i128 {
        self.cached_at_millis as i128 + ttl_seconds as i128 * 1000
    }
}
