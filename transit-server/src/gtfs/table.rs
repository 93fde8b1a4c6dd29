//! Header-driven reading of GTFS text tables.
//!
//! Every GTFS file is a comma-separated table whose first row names the
//! columns. Rows are exposed as column-name lookups; a column missing from a
//! short row reads as the empty string, never as an error.

use std::collections::HashMap;
use std::fmt;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::warn;

/// The eight tables a feed is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableName {
    Agency,
    Routes,
    Stops,
    Trips,
    StopTimes,
    Calendar,
    CalendarDates,
    Shapes,
}

impl TableName {
    /// All tables, in load order.
    pub const ALL: [TableName; 8] = [
        TableName::Agency,
        TableName::Routes,
        TableName::Stops,
        TableName::Trips,
        TableName::StopTimes,
        TableName::Calendar,
        TableName::CalendarDates,
        TableName::Shapes,
    ];

    /// Table name without extension, e.g. "stop_times".
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Agency => "agency",
            TableName::Routes => "routes",
            TableName::Stops => "stops",
            TableName::Trips => "trips",
            TableName::StopTimes => "stop_times",
            TableName::Calendar => "calendar",
            TableName::CalendarDates => "calendar_dates",
            TableName::Shapes => "shapes",
        }
    }

    /// File name inside the feed, e.g. "stop_times.txt".
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.as_str())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed table: header plus data rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: HashMap<String, usize>,
    records: Vec<StringRecord>,
    /// Rows the reader could not decode at all
    unreadable: usize,
}

impl Table {
    /// Parse table text.
    ///
    /// Empty text yields an empty table. Rows may be shorter or longer than the
    /// header. Rows that cannot be decoded are counted and dropped; only a
    /// header that cannot be read fails the whole table.
    pub fn parse(name: TableName, text: &str) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let columns = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();

        let mut records = Vec::new();
        let mut unreadable = 0;
        for result in reader.records() {
            match result {
                Ok(record) if record.iter().all(str::is_empty) => {}
                Ok(record) => records.push(record),
                Err(e) => {
                    unreadable += 1;
                    warn!(table = %name, error = %e, "skipping unreadable row");
                }
            }
        }

        Ok(Self {
            columns,
            records,
            unreadable,
        })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows dropped because they could not be decoded.
    pub fn unreadable_rows(&self) -> usize {
        self.unreadable
    }

    /// Returns true if the header names this column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Iterate over the data rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |record| Row {
            columns: &self.columns,
            record,
        })
    }
}

/// One data row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Value of a column, or "" if the column or the field is missing.
    pub fn get(&self, column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&i| self.record.get(i))
            .unwrap_or("")
    }

    /// Value of a column, or `None` if it is missing or empty.
    pub fn optional(&self, column: &str) -> Option<&'a str> {
        Some(self.get(column)).filter(|v| !v.is_empty())
    }

    /// The row as a column-name to value map.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.columns
            .iter()
            .map(|(name, _)| (name.clone(), self.get(name).to_string()))
            .collect()
    }
}
