//! Mobile Alerts measurement history
//!
//! Builds the measurement-details URL for a device and time window, scrapes
//! the first HTML table of the response, extracts one column of decorated
//! readings and reduces it to a single value.
//!
//! # Example
//!
//! ```ignore
//! use ma_history::DataFetcher;
//!
//! let mut fetcher = DataFetcher::new(&historic_config, chrono_tz::UTC)?;
//! fetcher.update().await?;
//! if let Some(value) = fetcher.data() {
//!     println!("{} {}", value, fetcher.unit().unwrap_or_default());
//! }
//! ```

pub mod aggregate;
mod error;
mod fetcher;
pub mod table;
mod throttle;
pub mod units;
pub mod url;

pub use aggregate::{aggregate, display_value, reduce};
pub use error::{HistoryError, HistoryResult};
pub use fetcher::{
    DataFetcher, TableFetcher, MIN_TIME_BETWEEN_UPDATES, REQUEST_TIMEOUT, USER_AGENT,
};
pub use table::{MeasurementTable, Readings};
pub use throttle::Throttle;
pub use units::{extract_value_unit, parse_decorated, DecoratedValue};
pub use url::{history_url, TimeWindow, HISTORY_URL};
