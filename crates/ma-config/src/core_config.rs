//! Core host configuration
//!
//! Parses the `homeassistant:` section from configuration.yaml. Only the
//! location name and the time zone matter to the Mobile Alerts platform.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{ConfigError, ConfigResult};

/// Core configuration from the `homeassistant:` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Name of the location (e.g., "Home")
    #[serde(default = "default_name")]
    pub name: String,

    /// IANA time zone (e.g., "Europe/Prague")
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_name() -> String {
    "Home".to_string()
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            time_zone: default_time_zone(),
        }
    }
}

impl CoreConfig {
    /// Parse core configuration from the root configuration mapping
    ///
    /// A missing `homeassistant:` section yields the defaults.
    pub fn from_yaml(root: &Value) -> ConfigResult<Self> {
        let section = match root.get("homeassistant") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(section) => section.clone(),
        };

        let config: CoreConfig =
            serde_yaml::from_value(section).map_err(|e| ConfigError::InvalidValue {
                key: "homeassistant".to_string(),
                reason: e.to_string(),
            })?;

        config.tz()?;
        Ok(config)
    }

    /// Resolve the configured time zone
    pub fn tz(&self) -> ConfigResult<Tz> {
        parse_time_zone(&self.time_zone)
    }
}

/// Parse an IANA time zone name
pub fn parse_time_zone(name: &str) -> ConfigResult<Tz> {
    name.parse::<Tz>().map_err(|e| ConfigError::InvalidValue {
        key: "time_zone".to_string(),
        reason: e.to_string(),
    })
}
