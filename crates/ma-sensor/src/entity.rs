//! The capability contract the host drives sensors through

use async_trait::async_trait;
use ma_core::attributes::{ATTR_FRIENDLY_NAME, ATTR_UNIT_OF_MEASUREMENT};
use ma_core::{EntityId, SensorValue};
use std::collections::HashMap;

use crate::error::SensorResult;

/// A sensor entity as seen by the host loop
#[async_trait]
pub trait Entity: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Entity id the state is published under
    fn entity_id(&self) -> &EntityId;

    /// Last computed value, `None` before the first successful update
    fn state(&self) -> Option<SensorValue>;

    fn unit_of_measurement(&self) -> Option<&str>;

    /// Static attributes published next to the state
    fn extra_state_attributes(&self) -> HashMap<String, serde_json::Value>;

    /// Whether the host should update the entity before publishing it
    fn update_before_add(&self) -> bool {
        false
    }

    /// Recompute the state
    async fn update(&mut self) -> SensorResult<()>;

    /// Full attribute map for the published state
    fn state_attributes(&self) -> HashMap<String, serde_json::Value> {
        let mut attributes = self.extra_state_attributes();
        attributes.insert(ATTR_FRIENDLY_NAME.to_string(), self.name().into());
        if let Some(unit) = self.unit_of_measurement() {
            if !unit.is_empty() {
                attributes.insert(ATTR_UNIT_OF_MEASUREMENT.to_string(), unit.into());
            }
        }
        attributes
    }
}
