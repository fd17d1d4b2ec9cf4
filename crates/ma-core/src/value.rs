//! Sensor state values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric sensor reading as exposed to the host
///
/// Aggregates above 100 in magnitude are reported as integers, everything
/// else keeps one decimal place, so both shapes need to survive formatting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(i64),
    Float(f64),
}

impl SensorValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            SensorValue::Integer(i) => i as f64,
            SensorValue::Float(f) => f,
        }
    }
}

impl Default for SensorValue {
    fn default() -> Self {
        SensorValue::Integer(0)
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Integer(i) => write!(f, "{}", i),
            // `{:?}` keeps the trailing `.0` on whole floats ("20.0", not "20")
            SensorValue::Float(v) => write!(f, "{:?}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_float_shape() {
        assert_eq!(SensorValue::Integer(150).to_string(), "150");
        assert_eq!(SensorValue::Float(20.0).to_string(), "20.0");
        assert_eq!(SensorValue::Float(42.3).to_string(), "42.3");
        assert_eq!(SensorValue::Float(-3.5).to_string(), "-3.5");
    }

    #[test]
    fn test_serialize_as_plain_number() {
        assert_eq!(serde_json::to_string(&SensorValue::Integer(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&SensorValue::Float(7.5)).unwrap(), "7.5");
        assert_eq!(SensorValue::default().as_f64(), 0.0);
    }
}
