//! GTFS feed loading and the current snapshot.
//!
//! Provides the feed loader, a TTL cache of the built store, and the
//! process-wide handle that the web layer reads from and that is refreshed
//! periodically.

mod cache;
mod client;
mod error;
mod handle;

pub use cache::{CacheConfig, FeedCache};
pub use client::{DEFAULT_FEED_URL, FeedConfig, FeedLoader, FeedSource};
pub use error::FeedError;
pub use handle::{FeedHandle, RetryBackoff};
