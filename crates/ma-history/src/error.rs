//! Error types for fetching and scraping measurement history

use thiserror::Error;

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that abort an update cycle
///
/// Connection failures, timeouts and pages without a table are not errors:
/// the fetcher reports those as "no data" and keeps its previous value.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Any request failure other than connect/timeout
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("requests getting data: {status}, {url}")]
    HttpStatus { status: u16, url: String },

    /// The requested column is not part of the table header
    #[error("column '{column}' not found in sensor data {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// A body row is shorter than the located column
    #[error("row {row} has no cell in column {column}")]
    MissingCell { row: usize, column: usize },

    /// A cell does not hold a number followed by an optional unit
    #[error("invalid reading '{text}': {reason}")]
    InvalidReading { text: String, reason: String },
}
