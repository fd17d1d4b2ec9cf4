//! Mobile Alerts sensor entities
//!
//! Turns validated `mobilealerts` platform entries into sensor entities the
//! host loop updates and publishes. Historic sensors aggregate the vendor's
//! measurement history, current sensors mirror a weather entity's attributes.

mod entity;
mod error;
mod platform;
mod sensor;

pub use entity::Entity;
pub use error::{SensorError, SensorResult};
pub use platform::{current_sensor_name, setup_platform};
pub use sensor::{attribution, MobileAlertsSensor, DEFAULT_SOURCE};
