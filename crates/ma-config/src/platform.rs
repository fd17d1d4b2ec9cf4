//! Mobile Alerts sensor platform schema
//!
//! A platform entry lives in the `sensor:` list of configuration.yaml:
//!
//! ```yaml
//! sensor:
//!   - platform: mobilealerts
//!     name: Garden max temperature
//!     device_id: 0E7EA4A71203
//!     device_class: temperature
//!     method: maximum
//!     duration: 24
//!   - platform: mobilealerts
//!     name: MA
//!     mode: current
//!     weather: weather.garden
//!     devices: [temperature, humidity]
//! ```
//!
//! A non-empty `device_id` selects historic mode, otherwise the entry mirrors
//! attributes of an existing weather entity.

use ma_core::{AggregationMethod, DeviceClass, EntityId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// Platform name matched against the `platform:` key
pub const PLATFORM: &str = "mobilealerts";

/// Default aggregation window in hours
pub const DEFAULT_DURATION_HOURS: u32 = 24;

/// Declared sensor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMode {
    #[default]
    Historic,
    Current,
}

/// Platform entry as written by the user, before cross-field validation
#[derive(Debug, Clone, Deserialize)]
struct RawPlatformConfig {
    name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    device_id: String,
    #[serde(default)]
    device_class: Option<DeviceClass>,
    #[serde(default)]
    mode: SensorMode,
    #[serde(default, deserialize_with = "one_or_many")]
    devices: Vec<DeviceClass>,
    #[serde(default, deserialize_with = "method_alias")]
    method: Option<AggregationMethod>,
    #[serde(default = "default_duration")]
    duration: u32,
    #[serde(default)]
    weather: Option<String>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_HOURS
}

/// Settings for a sensor that aggregates the vendor's measurement history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricConfig {
    pub device_id: String,
    pub device_class: DeviceClass,
    pub method: AggregationMethod,
    pub duration_hours: u32,
}

/// Settings for sensors that mirror attributes of a weather entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentConfig {
    pub weather: EntityId,
    pub devices: Vec<DeviceClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorSource {
    Historic(HistoricConfig),
    Current(CurrentConfig),
}

/// A validated `mobilealerts` platform entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub name: String,
    pub source: SensorSource,
}

impl PlatformConfig {
    /// Validate one platform entry
    pub fn from_yaml(value: &Value) -> ConfigResult<Self> {
        let raw: RawPlatformConfig =
            serde_yaml::from_value(value.clone()).map_err(|e| ConfigError::InvalidPlatform {
                platform: PLATFORM.to_string(),
                source: e,
            })?;

        if raw.name.trim().is_empty() {
            return Err(validation(format!("{}: name must not be empty", PLATFORM)));
        }

        let historic = !raw.device_id.is_empty();
        let declared_historic = raw.mode == SensorMode::Historic;
        if historic != declared_historic {
            warn!(
                name = %raw.name,
                mode = ?raw.mode,
                "Configured mode disagrees with device_id; device_id decides"
            );
        }

        let source = if historic {
            SensorSource::Historic(raw.historic()?)
        } else {
            SensorSource::Current(raw.current()?)
        };

        Ok(Self {
            name: raw.name,
            source,
        })
    }

    pub fn mode(&self) -> SensorMode {
        match self.source {
            SensorSource::Historic(_) => SensorMode::Historic,
            SensorSource::Current(_) => SensorMode::Current,
        }
    }
}

impl RawPlatformConfig {
    fn historic(&self) -> ConfigResult<HistoricConfig> {
        let device_class = self.device_class.ok_or_else(|| {
            validation(format!(
                "{}: device_class is required when device_id is set",
                self.name
            ))
        })?;
        let method = self.method.ok_or_else(|| {
            validation(format!(
                "{}: method is required when device_id is set",
                self.name
            ))
        })?;
        if self.duration == 0 {
            return Err(validation(format!(
                "{}: duration must be a positive number of hours",
                self.name
            )));
        }

        Ok(HistoricConfig {
            device_id: self.device_id.clone(),
            device_class,
            method,
            duration_hours: self.duration,
        })
    }

    fn current(&self) -> ConfigResult<CurrentConfig> {
        let weather = self.weather.as_deref().ok_or_else(|| {
            validation(format!(
                "{}: weather is required when device_id is not set",
                self.name
            ))
        })?;
        let weather: EntityId = weather.parse().map_err(|e| ConfigError::InvalidValue {
            key: "weather".to_string(),
            reason: format!("'{}': {}", weather, e),
        })?;

        if self.devices.is_empty() {
            warn!(name = %self.name, "No devices listed; no current sensors will be created");
        }

        Ok(CurrentConfig {
            weather,
            devices: self.devices.clone(),
        })
    }
}

fn validation(message: String) -> ConfigError {
    ConfigError::ValidationFailed { message }
}

/// Collect the `sensor:` entries that belong to this platform
///
/// A single mapping is accepted as a one-element list.
pub fn platform_entries(root: &Value) -> Vec<Value> {
    let entries = match root.get("sensor") {
        Some(Value::Sequence(seq)) => seq.clone(),
        Some(map @ Value::Mapping(_)) => vec![map.clone()],
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter(|entry| entry.get("platform").and_then(Value::as_str) == Some(PLATFORM))
        .collect()
}

/// Accept a device id written as a bare number (`device_id: 123456`)
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, got {:?}",
            other
        ))),
    }
}

/// Accept a single device class or a list of them
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<DeviceClass>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(DeviceClass),
        Many(Vec<DeviceClass>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(class)) => vec![class],
        Some(OneOrMany::Many(classes)) => classes,
    })
}

/// Accept `max`/`min` as shorthands for `maximum`/`minimum`
fn method_alias<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AggregationMethod>, D::Error> {
    let Some(name) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let name = match name.as_str() {
        "max" => "maximum",
        "min" => "minimum",
        other => other,
    };
    name.parse().map(Some).map_err(serde::de::Error::custom)
}
