//! Caching layer for loaded feeds.
//!
//! Loading a feed means fetching and indexing every table, so a built
//! store is kept until its TTL runs out and shared by everything that asks
//! for it.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::gtfs::GtfsStore;

use super::client::FeedLoader;
use super::error::FeedError;

/// Configuration for the feed cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for a loaded feed.
    pub ttl: Duration,

    /// Maximum number of cached feeds.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            max_capacity: 4,
        }
    }
}

impl CacheConfig {
    /// Default settings with the given TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }
}

/// Feed loader with caching.
///
/// Wraps a `FeedLoader` and keeps the built store, keyed by feed source.
#[derive(Debug)]
pub struct FeedCache {
    loader: FeedLoader,
    feeds: MokaCache<String, Arc<GtfsStore>>,
}

impl FeedCache {
    /// Create a new cached loader.
    pub fn new(loader: FeedLoader, config: &CacheConfig) -> Self {
        let feeds = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { loader, feeds }
    }

    fn key(&self) -> String {
        self.loader.source().to_string()
    }

    /// Get the feed, loading it if it isn't cached or has expired.
    pub async fn get(&self) -> Result<Arc<GtfsStore>, FeedError> {
        let key = self.key();

        // Try cache first
        if let Some(cached) = self.feeds.get(&key).await {
            debug!(source = %key, "feed cache hit");
            return Ok(cached);
        }

        let store = Arc::new(self.loader.load().await?);
        self.feeds.insert(key, store.clone()).await;

        Ok(store)
    }

    /// Drop the cached feed and load it again.
    ///
    /// On failure nothing stays cached, so the next `get` retries the load.
    pub async fn reload(&self) -> Result<Arc<GtfsStore>, FeedError> {
        self.feeds.invalidate(&self.key()).await;
        self.get().await
    }

    /// Access the underlying loader.
    pub fn loader(&self) -> &FeedLoader {
        &self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedConfig;
    use crate::feed::client::test_dir::write_feed;
    use tempfile::tempdir;

    fn cache(dir: &std::path::Path) -> FeedCache {
        let loader = FeedLoader::new(FeedConfig::directory(dir)).unwrap();
        FeedCache::new(loader, &CacheConfig::default())
    }

    #[test]
    fn default_ttl_is_a_day() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(86_400));
    }

    #[tokio::test]
    async fn get_reuses_loaded_store() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let cache = cache(dir.path());

        let first = cache.get().await.unwrap();
        // Later changes on disk are not seen until reload
        std::fs::remove_file(dir.path().join("stops.txt")).unwrap();
        let second = cache.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn expired_entry_is_reloaded() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let loader = FeedLoader::new(FeedConfig::directory(dir.path())).unwrap();
        let cache = FeedCache::new(loader, &CacheConfig::with_ttl(Duration::from_millis(50)));

        let first = cache.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &cache.get().await.unwrap()));

        tokio::time::sleep(Duration::from_millis(150)).await;
        let second = cache.get().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn reload_fetches_again() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let cache = cache(dir.path());

        let first = cache.get().await.unwrap();
        let reloaded = cache.reload().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));

        std::fs::remove_file(dir.path().join("trips.txt")).unwrap();
        assert!(matches!(
            cache.reload().await,
            Err(FeedError::Incomplete { .. })
        ));
        assert!(cache.get().await.is_err());
    }
}
