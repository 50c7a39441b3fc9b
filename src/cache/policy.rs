use crate::cache::token::CachedToken;
use crate::record::CredentialRecord;

/// Cached token usable at `now_millis`, if any.
///
/// Requires a ttl and a cache pair, and `now < cachedAt + ttl * 1000`.
/// A token expiring exactly at `now` is expired.
pub fn cached_token(record: &CredentialRecord, now_millis: i64) -> Option<&str> {
    let ttl_seconds = record.ttl_seconds?;
    record
        .cache
        .as_ref()
        .filter(|cache| (now_millis as i128) < cache.expires_at_millis(ttl_seconds))
        .map(|cache| cache.token.as_str())
}

pub fn is_cache_valid(record: &CredentialRecord, now_millis: i64) -> bool {
    cached_token(record, now_millis).is_some()
}

/// Record with the cache pair replaced by `token` issued at `now_millis`.
/// Without a ttl the record is returned unchanged and must not be persisted.
pub fn refresh(record: &CredentialRecord, now_millis: i64, token: &str) -> CredentialRecord {
    let mut refreshed = record.clone();
    if refreshed.ttl_seconds.is_some() {
        refreshed.cache = Some(CachedToken::new(token.to_owned(), now_millis));
    }
    refreshed
}
