//! GTFS feed loader.
//!
//! Fetches the eight feed tables over HTTP or reads them from a local
//! directory. All tables are requested at once; the feed only loads if every
//! one of them arrives and parses.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::gtfs::{FeedTables, GtfsStore, Table, TableName};

use super::error::FeedError;

/// Default base URL for the feed.
pub const DEFAULT_FEED_URL: &str = "https://raw.githubusercontent.com/magoxado/gtfs/main/";

/// Where the feed tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// `<base_url>/<table>.txt` for each table
    Http { base_url: String },
    /// `<dir>/<table>.txt` for each table
    Directory(PathBuf),
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Http { base_url } => f.write_str(base_url),
            FeedSource::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Configuration for the feed loader.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Where to load tables from
    pub source: FeedSource,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Load from an HTTP base URL.
    pub fn http(base_url: impl Into<String>) -> Self {
        Self {
            source: FeedSource::Http {
                base_url: base_url.into(),
            },
            timeout_secs: 30,
        }
    }

    /// Load from a local directory.
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: FeedSource::Directory(dir.into()),
            timeout_secs: 30,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::http(DEFAULT_FEED_URL)
    }
}

/// Loader for GTFS feeds.
#[derive(Debug, Clone)]
pub struct FeedLoader {
    http: reqwest::Client,
    source: FeedSource,
}

impl FeedLoader {
    /// Create a new loader.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            source: config.source,
        })
    }

    /// Where this loader reads from.
    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    fn table_url(base_url: &str, table: TableName) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), table.file_name())
    }

    async fn fetch_text(&self, table: TableName) -> Result<String, FeedError> {
        match &self.source {
            FeedSource::Http { base_url } => {
                let url = Self::table_url(base_url, table);
                debug!(%url, "fetching table");

                let response = self.http.get(&url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FeedError::Status {
                        table,
                        status: status.as_u16(),
                    });
                }

                Ok(response.text().await?)
            }
            FeedSource::Directory(dir) => {
                let path = dir.join(table.file_name());
                debug!(path = %path.display(), "reading table");

                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FeedError::Io { table, source })
            }
        }
    }

    async fn fetch_table(&self, table: TableName) -> Result<Table, FeedError> {
        let text = self.fetch_text(table).await?;
        let parsed =
            Table::parse(table, &text).map_err(|source| FeedError::Parse { table, source })?;
        debug!(%table, rows = parsed.len(), "parsed table");
        Ok(parsed)
    }

    /// Fetch and parse all eight tables.
    ///
    /// Every table is attempted even if others fail. If any fails, the error
    /// lists all the failed tables.
    pub async fn load_tables(&self) -> Result<FeedTables, FeedError> {
        let results = join_all(TableName::ALL.iter().map(|&t| self.fetch_table(t))).await;

        let mut tables = FeedTables::default();
        let mut failed = Vec::new();
        for (name, result) in TableName::ALL.into_iter().zip(results) {
            match result {
                Ok(table) => *tables.table_mut(name) = table,
                Err(e) => {
                    warn!(table = %name, error = %e, "failed to load table");
                    failed.push(name);
                }
            }
        }

        if failed.is_empty() {
            Ok(tables)
        } else {
            Err(FeedError::Incomplete { tables: failed })
        }
    }

    /// Load the feed and build a store from it.
    pub async fn load(&self) -> Result<GtfsStore, FeedError> {
        info!(source = %self.source, "loading GTFS feed");
        let tables = self.load_tables().await?;
        Ok(GtfsStore::from_tables(&tables))
    }
}
