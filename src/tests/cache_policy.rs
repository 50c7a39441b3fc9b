#[cfg(test)]
mod test {

    use crate::cache::policy::{cached_token, is_cache_valid, refresh};
    use crate::cache::token::CachedToken;
    use crate::record::CredentialRecord;

    const T0: i64 = 1_700_000_000_000;

    fn cached(ttl: Option<u64>, at: i64) -> CredentialRecord {
        let mut record = CredentialRecord::new("k", "org1", "c1", ttl);
        record.cache = Some(CachedToken::new("cached".into(), at));
        record
    }

    #[test]
    fn without_ttl_cache_is_never_valid() {
        let record = cached(None, T0);
        for now in [T0 - 1, T0, T0 + 1, T0 + 3_600_000, i64::MAX] {
            assert!(!is_cache_valid(&record, now), "now = {}", now);
        }
    }

    #[test]
    fn missing_cache_pair_is_never_valid() {
        let record = CredentialRecord::new("k", "org1", "c1", Some(60));
        assert!(!is_cache_valid(&record, T0));
    }

    #[test]
    fn validity_window_is_strict_at_expiry() {
        let record = cached(Some(60), T0);
        assert!(is_cache_valid(&record, T0));
        assert!(is_cache_valid(&record, T0 + 59_999));
        assert!(!is_cache_valid(&record, T0 + 60_000), "expires exactly at cachedAt + ttl");
        assert!(!is_cache_valid(&record, T0 + 60_001));
        assert_eq!(cached_token(&record, T0 + 1), Some("cached"));
    }

    #[test]
    fn zero_ttl_is_valid_only_before_issuance_instant() {
        let record = cached(Some(0), T0);
        assert!(!is_cache_valid(&record, T0));
        assert!(!is_cache_valid(&record, T0 + 1));
        assert!(is_cache_valid(&record, T0 - 1));
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        let record = cached(Some(u64::MAX), i64::MAX - 1);
        assert!(is_cache_valid(&record, i64::MAX));
    }

    #[test]
    fn refresh_sets_pair_and_keeps_credentials() {
        let mut record = CredentialRecord::new("k", "org1", "c1", Some(30));
        record.extra.insert("note".into(), serde_json::json!("kept"));

        let refreshed = refresh(&record, T0, "fresh");
        assert_eq!(refreshed.cache, Some(CachedToken::new("fresh".into(), T0)));
        assert_eq!(refreshed.key_file, record.key_file);
        assert_eq!(refreshed.organization, record.organization);
        assert_eq!(refreshed.cluster, record.cluster);
        assert_eq!(refreshed.ttl_seconds, Some(30));
        assert_eq!(refreshed.extra.get("note"), Some(&serde_json::json!("kept")));
        assert!(is_cache_valid(&refreshed, T0));
    }

    #[test]
    fn refresh_without_ttl_leaves_record_untouched() {
        let record = CredentialRecord::new("k", "org1", "c1", None);
        let refreshed = refresh(&record, T0, "fresh");
        assert_eq!(refreshed, record);
        assert!(refreshed.cache.is_none());
    }
}
