//! Core types for the Mobile Alerts sensor platform
//!
//! This crate provides the types shared by the fetcher, the sensor entities
//! and the host loop: EntityId, State, the StateStore with its read-only
//! StateLookup view, device classes, aggregation methods and SensorValue.

mod device_class;
mod entity_id;
mod state;
mod store;
mod value;

pub use device_class::{AggregationMethod, DeviceClass};
pub use entity_id::{slugify, EntityId, EntityIdError, SENSOR_DOMAIN};
pub use state::State;
pub use store::{SharedStateStore, StateLookup, StateStore};
pub use value::SensorValue;

/// State value written when an entity failed to update
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// State value of an entity that has not produced a reading yet
pub const STATE_UNKNOWN: &str = "unknown";

/// Standard attribute keys
pub mod attributes {
    /// Attribution text naming the data source
    pub const ATTR_ATTRIBUTION: &str = "attribution";

    /// Display name of the entity
    pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";

    /// Unit the state value is expressed in
    pub const ATTR_UNIT_OF_MEASUREMENT: &str = "unit_of_measurement";
}
