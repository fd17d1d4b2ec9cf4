//! Measurement history URL construction

use chrono::{DateTime, Duration, TimeZone};

/// Mobile Alerts measurement details page
pub const HISTORY_URL: &str = "https://measurements.mobile-alerts.eu/Home/MeasurementDetails";

/// Vendor id the Mobile Alerts app sends
pub const VENDOR_ID: &str = "bb8e868c-e5fd-4130-8d72-b08d1013c98e";

/// App bundle the Mobile Alerts app sends
pub const APP_BUNDLE: &str = "eu.mobile_alerts.mobilealerts";

/// Epoch-second bounds of a history request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from_epoch: i64,
    pub to_epoch: i64,
}

impl TimeWindow {
    /// The `duration_hours` hours ending at `now`
    pub fn ending_at<Tz: TimeZone>(now: &DateTime<Tz>, duration_hours: u32) -> Self {
        let start = now.clone() - Duration::hours(i64::from(duration_hours));
        Self {
            from_epoch: start.timestamp(),
            to_epoch: now.timestamp(),
        }
    }
}

/// Build the history URL for a device over the window ending at `now`
///
/// `base_url` is normally [`HISTORY_URL`].
pub fn history_url<Tz: TimeZone>(
    base_url: &str,
    device_id: &str,
    duration_hours: u32,
    now: &DateTime<Tz>,
) -> String {
    let window = TimeWindow::ending_at(now, duration_hours);
    format!(
        "{}?vendorid={}&appbundle={}&deviceid={}&fromepoch={}&toepoch={}",
        base_url, VENDOR_ID, APP_BUNDLE, device_id, window.from_epoch, window.to_epoch
    )
}
