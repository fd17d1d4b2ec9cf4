//! Platform setup: config entry to sensor entities

use chrono_tz::Tz;
use ma_config::{PlatformConfig, SensorSource};
use ma_core::StateLookup;
use ma_history::DataFetcher;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::{SensorError, SensorResult};
use crate::sensor::MobileAlertsSensor;

/// Name of a current-mode sensor for one device class, e.g. `ma_temperature`
pub fn current_sensor_name(platform_name: &str, device_class_key: &str) -> String {
    format!("{}_{}", platform_name.to_lowercase(), device_class_key)
}

/// Create the sensors described by one platform entry
///
/// Historic entries yield a single sensor. Current entries yield one sensor
/// per listed device class and require the weather entity to exist already.
#[instrument(skip(config, states), fields(name = %config.name))]
pub fn setup_platform(
    config: &PlatformConfig,
    time_zone: Tz,
    states: Arc<dyn StateLookup>,
) -> SensorResult<Vec<MobileAlertsSensor>> {
    match &config.source {
        SensorSource::Historic(historic) => {
            let fetcher = DataFetcher::new(historic, time_zone)?;
            info!(
                device_id = %historic.device_id,
                class = %historic.device_class,
                method = %historic.method,
                hours = historic.duration_hours,
                "Setting up historic sensor"
            );
            Ok(vec![MobileAlertsSensor::historic(&config.name, fetcher)?])
        }
        SensorSource::Current(current) => {
            let weather = current.weather.to_string();
            if !states.contains(&weather) {
                return Err(SensorError::WeatherEntityNotFound(weather));
            }

            info!(weather = %weather, devices = current.devices.len(), "Setting up current sensors");
            current
                .devices
                .iter()
                .map(|device_class| {
                    MobileAlertsSensor::current(
                        current_sensor_name(&config.name, device_class.key()),
                        *device_class,
                        current.weather.clone(),
                        states.clone(),
                    )
                })
                .collect()
        }
    }
}
