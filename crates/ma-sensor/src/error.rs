//! Error types for sensor setup and updates

use ma_config::ConfigError;
use ma_core::EntityIdError;
use ma_history::HistoryError;
use thiserror::Error;

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid entity id: {0}")]
    EntityId(#[from] EntityIdError),

    /// The weather entity a current-mode sensor mirrors has no state
    #[error("weather Entity {0} not found")]
    WeatherEntityNotFound(String),

    /// The weather entity has no attribute for the sensor's device class
    #[error("weather entity {entity_id} has no '{attribute}' attribute")]
    AttributeMissing {
        entity_id: String,
        attribute: String,
    },

    /// The attribute holds something other than a decorated number
    #[error("unexpected '{attribute}' value on {entity_id}: {value}")]
    InvalidAttribute {
        entity_id: String,
        attribute: String,
        value: serde_json::Value,
    },
}
