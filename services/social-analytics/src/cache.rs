//! Keyed cache with a fixed time-to-live

use std::time::Duration;

use moka::future::Cache;

/// Upper bound on entries per cache; one per user or per post.
pub const MAX_ENTRIES: u64 = 10_000;

/// String-keyed cache whose entries expire `ttl` after insertion.
///
/// Expired entries are evicted by moka's housekeeping whether or not their
/// key is looked up again.
pub type TtlCache<V> = Cache<String, V>;

pub fn ttl_cache<V>(ttl: Duration) -> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(MAX_ENTRIES)
        .time_to_live(ttl)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    // moka keeps its own clock, so expiry is exercised with short real TTLs.
    const TTL: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn hit_within_ttl() {
        let cache = ttl_cache(Duration::from_secs(60));
        cache.insert("users".to_string(), vec![1, 2]).await;

        assert_eq!(cache.get("users").await, Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn miss_after_ttl() {
        let cache = ttl_cache(TTL);
        cache.insert("user_posts_1".to_string(), "posts").await;

        tokio::time::sleep(TTL * 2).await;
        assert_eq!(cache.get("user_posts_1").await, None);
    }

    #[tokio::test]
    async fn insert_refreshes_expiry() {
        let cache = ttl_cache(TTL);
        cache.insert("k".to_string(), 1).await;
        tokio::time::sleep(TTL / 2).await;
        cache.insert("k".to_string(), 2).await;

        assert_eq!(cache.get("k").await, Some(2));
    }

    #[tokio::test]
    async fn expired_keys_evicted_without_lookup() {
        let cache = ttl_cache(TTL);
        for id in 0..1000 {
            cache.insert(format!("user_posts_{id}"), id).await;
        }
        tokio::time::sleep(TTL * 2).await;
        cache.insert("users".to_string(), 0).await;
        cache.run_pending_tasks().await;

        assert_eq!(cache.entry_count(), 1);
    }

    #[tokio::test]
    async fn unknown_key_misses() {
        let cache: TtlCache<u8> = ttl_cache(Duration::from_secs(60));
        assert_eq!(cache.get("post_comments_7").await, None);
    }
}
