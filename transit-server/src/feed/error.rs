//! Feed loading error types.

use crate::gtfs::TableName;

/// Errors that can occur when loading a GTFS feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status for a table
    #[error("{table}: server returned status {status}")]
    Status { table: TableName, status: u16 },

    /// Failed to read a table from disk
    #[error("{table}: {source}")]
    Io {
        table: TableName,
        #[source]
        source: std::io::Error,
    },

    /// Table header could not be read
    #[error("{table}: {source}")]
    Parse {
        table: TableName,
        #[source]
        source: csv::Error,
    },

    /// One or more tables failed; no store was built
    #[error("feed incomplete, failed tables: {}", join(.tables))]
    Incomplete { tables: Vec<TableName> },

    /// No feed has been loaded yet
    #[error("no feed loaded")]
    NotLoaded,
}

fn join(tables: &[TableName]) -> String {
    tables
        .iter()
        .map(TableName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_lists_tables() {
        let err = FeedError::Incomplete {
            tables: vec![TableName::Stops, TableName::Shapes],
        };
        assert_eq!(err.to_string(), "feed incomplete, failed tables: stops, shapes");
    }

    #[test]
    fn status_names_table() {
        let err = FeedError::Status {
            table: TableName::StopTimes,
            status: 404,
        };
        assert_eq!(err.to_string(), "stop_times: server returned status 404");
    }
}
