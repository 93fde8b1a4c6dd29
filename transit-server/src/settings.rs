//! Server settings from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::feed::{DEFAULT_FEED_URL, FeedConfig};

/// Environment variable names.
pub const FEED_URL_VAR: &str = "GTFS_FEED_URL";
pub const FEED_DIR_VAR: &str = "GTFS_FEED_DIR";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
pub const REFRESH_HOURS_VAR: &str = "FEED_REFRESH_HOURS";
pub const TIMEOUT_SECS_VAR: &str = "FEED_TIMEOUT_SECS";

/// Error reading settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {name}={value:?}: {reason}")]
pub struct SettingsError {
    pub name: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Settings for the server binary.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Where to serve HTTP
    pub bind_addr: SocketAddr,
    /// Where to load the feed from
    pub feed: FeedConfig,
    /// How often to reload the feed
    pub refresh_interval: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            feed: FeedConfig::default(),
            refresh_interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl ServerSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through a variable lookup.
    ///
    /// Unset or empty variables take their defaults. `GTFS_FEED_DIR` wins
    /// over `GTFS_FEED_URL` when both are set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind_addr = match var(BIND_ADDR_VAR) {
            Some(v) => v.trim().parse().map_err(|_| SettingsError {
                name: BIND_ADDR_VAR,
                value: v.clone(),
                reason: "expected host:port",
            })?,
            None => defaults.bind_addr,
        };

        let mut feed = match (var(FEED_DIR_VAR), var(FEED_URL_VAR)) {
            (Some(dir), _) => FeedConfig::directory(PathBuf::from(dir)),
            (None, Some(url)) => FeedConfig::http(url),
            (None, None) => FeedConfig::http(DEFAULT_FEED_URL),
        };
        if let Some(v) = var(TIMEOUT_SECS_VAR) {
            feed = feed.with_timeout_secs(positive(TIMEOUT_SECS_VAR, &v)?);
        }

        let refresh_interval = match var(REFRESH_HOURS_VAR) {
            Some(v) => {
                let hours = positive(REFRESH_HOURS_VAR, &v)?;
                let secs = hours.checked_mul(60 * 60).ok_or_else(|| SettingsError {
                    name: REFRESH_HOURS_VAR,
                    value: v.clone(),
                    reason: "too large",
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.refresh_interval,
        };

        Ok(Self {
            bind_addr,
            feed,
            refresh_interval,
        })
    }

    /// How often to ask the feed cache whether its entry has expired.
    ///
    /// A fraction of the refresh interval so an expired entry is noticed
    /// soon after the deadline, but never more than once a minute.
    pub fn check_interval(&self) -> Duration {
        (self.refresh_interval / 24).max(MIN_CHECK_INTERVAL)
    }
}

const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(60);

fn positive(name: &'static str, value: &str) -> Result<u64, SettingsError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(SettingsError {
            name,
            value: value.to_string(),
            reason: "expected a positive whole number",
        }),
    }
}
