//! Measurement history fetching
//!
//! [`TableFetcher`] performs the HTTP request and scrapes the first table of
//! the response. [`DataFetcher`] owns one configured device column, turns it
//! into an aggregate and caches the result behind an hourly [`Throttle`].

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use ma_config::HistoricConfig;
use ma_core::{AggregationMethod, DeviceClass, SensorValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::aggregate::reduce;
use crate::error::{HistoryError, HistoryResult};
use crate::table::MeasurementTable;
use crate::throttle::Throttle;
use crate::url::{history_url, HISTORY_URL};

/// The vendor page refuses requests without a browser-like agent
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Minimum time between two network refreshes of one fetcher
pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(60 * 60);

/// Upper bound for one history request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP GET + first-table extraction
#[derive(Debug, Clone)]
pub struct TableFetcher {
    client: Client,
}

impl TableFetcher {
    pub fn new() -> HistoryResult<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> HistoryResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(HistoryError::Client)?;

        Ok(Self { client })
    }

    /// Fetch `url` and return its first table
    ///
    /// Connection failures, timeouts and pages without a table give
    /// `Ok(None)`. A non-success status is an error.
    pub async fn fetch_table(&self, url: &str) -> HistoryResult<Option<MeasurementTable>> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if is_unreachable(&e) => {
                warn!("Unable to connect to Mobile Alerts URL {}: {}", url, e);
                return Ok(None);
            }
            Err(e) => {
                return Err(HistoryError::Http {
                    url: url.to_string(),
                    source: e,
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if is_unreachable(&e) => {
                warn!("Connection to Mobile Alerts URL {} dropped: {}", url, e);
                return Ok(None);
            }
            Err(e) => {
                return Err(HistoryError::Http {
                    url: url.to_string(),
                    source: e,
                })
            }
        };

        let table = MeasurementTable::first_in_html(&body);
        if table.is_none() {
            warn!("No data returned: {}", url);
        }
        Ok(table)
    }
}

fn is_unreachable(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout()
}

/// Aggregated history of one device column, refreshed at most once per interval
#[derive(Debug)]
pub struct DataFetcher {
    device_id: String,
    device_class: DeviceClass,
    method: AggregationMethod,
    duration_hours: u32,
    time_zone: Tz,
    base_url: String,
    tables: TableFetcher,
    throttle: Throttle,
    data: Option<SensorValue>,
    unit: Option<String>,
}

impl DataFetcher {
    pub fn new(config: &HistoricConfig, time_zone: Tz) -> HistoryResult<Self> {
        Ok(Self {
            device_id: config.device_id.clone(),
            device_class: config.device_class,
            method: config.method,
            duration_hours: config.duration_hours,
            time_zone,
            base_url: HISTORY_URL.to_string(),
            tables: TableFetcher::new()?,
            throttle: Throttle::new(MIN_TIME_BETWEEN_UPDATES),
            data: None,
            unit: None,
        })
    }

    /// Point the fetcher at another measurement page, e.g. a local mirror
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the request timeout, rebuilding the HTTP client
    pub fn with_timeout(mut self, timeout: Duration) -> HistoryResult<Self> {
        self.tables = TableFetcher::with_timeout(timeout)?;
        Ok(self)
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.throttle = Throttle::new(min_interval);
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    /// Last aggregate, `None` until a fetch returned data
    pub fn data(&self) -> Option<SensorValue> {
        self.data
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// History URL for the window ending at `now`
    pub fn history_url(&self, now: DateTime<Utc>) -> String {
        let local_now = now.with_timezone(&self.time_zone);
        history_url(
            &self.base_url,
            &self.device_id,
            self.duration_hours,
            &local_now,
        )
    }

    /// Refresh the cached aggregate unless the last refresh is too recent
    ///
    /// "No data" outcomes keep the previous value and still count as a
    /// refresh. Errors leave the throttle untouched.
    #[instrument(skip(self), fields(device_id = %self.device_id, class = %self.device_class))]
    pub async fn update(&mut self) -> HistoryResult<()> {
        if !self.throttle.is_ready() {
            debug!("Refresh skipped, last one was less than {:?} ago", self.throttle.min_interval());
            return Ok(());
        }

        let reading = self.get_reading().await?;
        self.throttle.mark();

        match reading {
            None => warn!("Failed to fetch data from Mobile Alerts"),
            Some((value, unit)) => {
                debug!(%value, %unit, "Updated aggregate");
                self.data = Some(value);
                self.unit = Some(unit);
            }
        }

        Ok(())
    }

    /// Fetch the history table and aggregate the configured column
    ///
    /// `Ok(None)` when the page could not be fetched or had no table. An
    /// empty column aggregates to 0 with an empty unit.
    pub async fn get_reading(&self) -> HistoryResult<Option<(SensorValue, String)>> {
        let url = self.history_url(Utc::now());
        debug!("Fetching {}", url);

        let Some(table) = self.tables.fetch_table(&url).await? else {
            return Ok(None);
        };

        let (readings, unit) = table.measurements(self.device_class.column_name(), true)?;
        let values = readings.as_numeric().unwrap_or_default();
        if values.is_empty() {
            return Ok(Some((SensorValue::Integer(0), String::new())));
        }

        Ok(Some((reduce(values, self.method), unit)))
    }
}
