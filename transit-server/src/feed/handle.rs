//! The current feed snapshot.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::gtfs::GtfsStore;

use super::cache::FeedCache;
use super::error::FeedError;

/// Delays between attempts while no snapshot is loaded.
///
/// The delay doubles after every failed attempt, up to `max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBackoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(5),
            max: Duration::from_secs(5 * 60),
        }
    }
}

impl RetryBackoff {
    /// Delay before attempt number `attempt` (starting at 0).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// Thread-safe holder of the current feed snapshot.
///
/// Queries take a cheap `Arc` clone of the snapshot and run without holding
/// the lock; a refresh swaps the whole snapshot at once.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    inner: Arc<RwLock<Option<Arc<GtfsStore>>>>,
    cache: Arc<FeedCache>,
}

impl FeedHandle {
    /// Create a new FeedHandle by loading the feed.
    ///
    /// This will fail if the feed can't be loaded completely.
    pub async fn fetch(cache: FeedCache) -> Result<Self, FeedError> {
        let store = cache.get().await?;

        Ok(Self {
            inner: Arc::new(RwLock::new(Some(store))),
            cache: Arc::new(cache),
        })
    }

    /// Create a handle with no snapshot yet.
    ///
    /// Requests fail with [`FeedError::NotLoaded`] until a refresh succeeds.
    pub fn empty(cache: FeedCache) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            cache: Arc::new(cache),
        }
    }

    /// Create a handle around an already built store.
    pub fn with_store(cache: FeedCache, store: GtfsStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(Arc::new(store)))),
            cache: Arc::new(cache),
        }
    }

    /// The current snapshot.
    pub async fn current(&self) -> Result<Arc<GtfsStore>, FeedError> {
        let guard = self.inner.read().await;
        guard.clone().ok_or(FeedError::NotLoaded)
    }

    /// Check whether a snapshot is loaded.
    pub async fn is_loaded(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_some()
    }

    /// Reload the feed.
    ///
    /// On success, replaces the current snapshot and returns its stop count.
    /// On failure, the existing snapshot is preserved and the error is
    /// returned.
    pub async fn refresh(&self) -> Result<usize, FeedError> {
        let store = match self.cache.reload().await {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "feed refresh failed, keeping current snapshot");
                return Err(e);
            }
        };
        let count = store.stops().len();

        let mut guard = self.inner.write().await;
        *guard = Some(store);
        info!(stops = count, "feed snapshot replaced");

        Ok(count)
    }

    /// Take the cached feed, loading it only if the cache entry expired.
    ///
    /// Returns true if the snapshot was replaced. A failed load leaves the
    /// current snapshot in place.
    pub async fn update(&self) -> Result<bool, FeedError> {
        let store = self.cache.get().await?;

        let mut guard = self.inner.write().await;
        if guard
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &store))
        {
            return Ok(false);
        }
        let count = store.stops().len();
        *guard = Some(store);
        info!(stops = count, "feed snapshot replaced");

        Ok(true)
    }

    /// Keep trying to load the feed until a snapshot exists.
    ///
    /// Returns the number of attempts made; zero if a snapshot was already
    /// loaded.
    pub async fn load_with_retry(&self, backoff: &RetryBackoff) -> u32 {
        let mut attempt = 0u32;
        while !self.is_loaded().await {
            tokio::time::sleep(backoff.delay(attempt)).await;
            attempt = attempt.saturating_add(1);
            match self.update().await {
                Ok(_) => info!(attempts = attempt, "feed loaded"),
                Err(e) => warn!(
                    attempts = attempt,
                    retry_in = ?backoff.delay(attempt),
                    error = %e,
                    "feed load failed"
                ),
            }
        }
        attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::client::test_dir::write_feed;
    use crate::feed::{CacheConfig, FeedConfig, FeedLoader};
    use tempfile::tempdir;

    fn cache(dir: &std::path::Path) -> FeedCache {
        let loader = FeedLoader::new(FeedConfig::directory(dir)).unwrap();
        FeedCache::new(loader, &CacheConfig::default())
    }

    #[tokio::test]
    async fn empty_handle_is_not_loaded() {
        let dir = tempdir().unwrap();
        let handle = FeedHandle::empty(cache(dir.path()));

        assert!(!handle.is_loaded().await);
        assert!(matches!(handle.current().await, Err(FeedError::NotLoaded)));
    }

    #[tokio::test]
    async fn refresh_loads_empty_handle() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let handle = FeedHandle::empty(cache(dir.path()));

        assert_eq!(handle.refresh().await.unwrap(), 3);
        assert_eq!(handle.current().await.unwrap().stops().len(), 3);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_snapshot() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let handle = FeedHandle::fetch(cache(dir.path())).await.unwrap();
        let before = handle.current().await.unwrap();

        std::fs::remove_file(dir.path().join("stop_times.txt")).unwrap();
        assert!(handle.refresh().await.is_err());

        let after = handle.current().await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    fn short_ttl_cache(dir: &std::path::Path) -> FeedCache {
        let loader = FeedLoader::new(FeedConfig::directory(dir)).unwrap();
        FeedCache::new(loader, &CacheConfig::with_ttl(Duration::from_millis(50)))
    }

    #[test]
    fn backoff_doubles_up_to_max() {
        let backoff = RetryBackoff::default();
        assert_eq!(backoff.delay(0), Duration::from_secs(5));
        assert_eq!(backoff.delay(1), Duration::from_secs(10));
        assert_eq!(backoff.delay(3), Duration::from_secs(40));
        assert_eq!(backoff.delay(6), Duration::from_secs(300));
        assert_eq!(backoff.delay(40), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn update_keeps_snapshot_while_cached() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let handle = FeedHandle::fetch(cache(dir.path())).await.unwrap();
        let before = handle.current().await.unwrap();

        assert!(!handle.update().await.unwrap());
        assert!(Arc::ptr_eq(&before, &handle.current().await.unwrap()));
    }

    #[tokio::test]
    async fn update_reloads_after_ttl() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let handle = FeedHandle::fetch(short_ttl_cache(dir.path())).await.unwrap();
        let before = handle.current().await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(handle.update().await.unwrap());
        assert!(!Arc::ptr_eq(&before, &handle.current().await.unwrap()));
    }

    #[tokio::test]
    async fn failed_update_keeps_snapshot() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let handle = FeedHandle::fetch(short_ttl_cache(dir.path())).await.unwrap();
        let before = handle.current().await.unwrap();

        std::fs::remove_file(dir.path().join("trips.txt")).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(handle.update().await.is_err());
        assert!(Arc::ptr_eq(&before, &handle.current().await.unwrap()));
    }

    #[tokio::test]
    async fn retry_is_skipped_when_loaded() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let handle = FeedHandle::fetch(cache(dir.path())).await.unwrap();

        assert_eq!(handle.load_with_retry(&RetryBackoff::default()).await, 0);
    }

    #[tokio::test]
    async fn retry_loads_once_feed_appears() {
        let base = tempdir().unwrap();
        let target = base.path().join("feed");
        let handle = FeedHandle::empty(cache(&target));
        let backoff = RetryBackoff {
            initial: Duration::from_millis(10),
            max: Duration::from_millis(20),
        };

        let retrying = handle.clone();
        let task = tokio::spawn(async move { retrying.load_with_retry(&backoff).await });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!handle.is_loaded().await);

        // Move a complete feed into place in one step
        let staging = base.path().join("staging");
        std::fs::create_dir(&staging).unwrap();
        write_feed(&staging);
        std::fs::rename(&staging, &target).unwrap();

        let attempts = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(attempts >= 2);
        assert_eq!(handle.current().await.unwrap().stops().len(), 3);
    }

    #[tokio::test]
    async fn fetch_fails_on_incomplete_feed() {
        let dir = tempdir().unwrap();
        assert!(FeedHandle::fetch(cache(dir.path())).await.is_err());
    }

    #[tokio::test]
    async fn clones_share_snapshot() {
        let dir = tempdir().unwrap();
        write_feed(dir.path());
        let handle = FeedHandle::empty(cache(dir.path()));
        let clone = handle.clone();

        handle.refresh().await.unwrap();
        assert!(clone.is_loaded().await);
    }
}
