//! Device classes and aggregation methods understood by the platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of reading a sensor reports
///
/// Each class maps to one column header of the Mobile Alerts measurement
/// table and to one attribute key on the weather entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Temperature,
    WindSpeed,
    Humidity,
    Pressure,
    Rain,
    Snow,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 6] = [
        DeviceClass::Temperature,
        DeviceClass::WindSpeed,
        DeviceClass::Humidity,
        DeviceClass::Pressure,
        DeviceClass::Rain,
        DeviceClass::Snow,
    ];

    /// Configuration key, also the weather entity attribute name
    pub fn key(&self) -> &'static str {
        match self {
            DeviceClass::Temperature => "temperature",
            DeviceClass::WindSpeed => "wind_speed",
            DeviceClass::Humidity => "humidity",
            DeviceClass::Pressure => "pressure",
            DeviceClass::Rain => "rain",
            DeviceClass::Snow => "snow",
        }
    }

    /// Header text of the matching column in the measurement table
    pub fn column_name(&self) -> &'static str {
        match self {
            DeviceClass::Temperature => "Temperature",
            DeviceClass::WindSpeed => "Wind speed",
            DeviceClass::Humidity => "Humidity",
            DeviceClass::Pressure => "Pressure",
            DeviceClass::Rain => "Rain",
            DeviceClass::Snow => "Snow",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.key() == s)
            .ok_or_else(|| format!("unknown device class '{}'", s))
    }
}

/// How a column of readings is reduced to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Maximum,
    Minimum,
    Mean,
    /// Newest reading minus oldest reading
    Difference,
}

impl AggregationMethod {
    pub const ALL: [AggregationMethod; 4] = [
        AggregationMethod::Maximum,
        AggregationMethod::Minimum,
        AggregationMethod::Mean,
        AggregationMethod::Difference,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AggregationMethod::Maximum => "maximum",
            AggregationMethod::Minimum => "minimum",
            AggregationMethod::Mean => "mean",
            AggregationMethod::Difference => "difference",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AggregationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.key() == s)
            .ok_or_else(|| format!("unknown aggregation method '{}'", s))
    }
}
