//! Mobile Alerts sensor entity
//!
//! A sensor runs in one of two modes, fixed at construction:
//!
//! - historic: owns a [`DataFetcher`] and reports its throttled aggregate
//! - current: mirrors one device-class attribute of a weather entity, read
//!   through a [`StateLookup`]

use async_trait::async_trait;
use ma_core::attributes::ATTR_ATTRIBUTION;
use ma_core::{DeviceClass, EntityId, SensorValue, StateLookup};
use ma_history::{extract_value_unit, DataFetcher};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::entity::Entity;
use crate::error::{SensorError, SensorResult};

/// Source named in the attribution of historic sensors
pub const DEFAULT_SOURCE: &str = "MobileAlerts";

/// Attribution text for a data source
pub fn attribution(source: &str) -> String {
    format!("Data provided by {}", source)
}

enum Source {
    Historic(DataFetcher),
    Current {
        device_class: DeviceClass,
        weather: EntityId,
        states: Arc<dyn StateLookup>,
    },
}

pub struct MobileAlertsSensor {
    name: String,
    entity_id: EntityId,
    source: Source,
    state: Option<SensorValue>,
    unit: Option<String>,
    attributes: HashMap<String, serde_json::Value>,
}

impl MobileAlertsSensor {
    /// Sensor reporting the aggregate of a device's history
    pub fn historic(name: impl Into<String>, fetcher: DataFetcher) -> SensorResult<Self> {
        Self::build(name.into(), Source::Historic(fetcher), DEFAULT_SOURCE)
    }

    /// Sensor mirroring the `device_class` attribute of `weather`
    pub fn current(
        name: impl Into<String>,
        device_class: DeviceClass,
        weather: EntityId,
        states: Arc<dyn StateLookup>,
    ) -> SensorResult<Self> {
        let source_name = weather.to_string();
        Self::build(
            name.into(),
            Source::Current {
                device_class,
                weather,
                states,
            },
            &source_name,
        )
    }

    fn build(name: String, source: Source, source_name: &str) -> SensorResult<Self> {
        let entity_id = EntityId::sensor_for_name(&name)?;
        let attributes = HashMap::from([(
            ATTR_ATTRIBUTION.to_string(),
            serde_json::Value::String(attribution(source_name)),
        )]);

        Ok(Self {
            name,
            entity_id,
            source,
            state: None,
            unit: None,
            attributes,
        })
    }

    pub fn is_historic(&self) -> bool {
        matches!(self.source, Source::Historic(_))
    }

    /// Device class the sensor reports, for either mode
    pub fn device_class(&self) -> DeviceClass {
        match &self.source {
            Source::Historic(fetcher) => fetcher.device_class(),
            Source::Current { device_class, .. } => *device_class,
        }
    }

    fn read_weather(
        device_class: DeviceClass,
        weather: &EntityId,
        states: &dyn StateLookup,
    ) -> SensorResult<(SensorValue, String)> {
        let entity_id = weather.to_string();
        let state = states
            .get(&entity_id)
            .ok_or_else(|| SensorError::WeatherEntityNotFound(entity_id.clone()))?;

        let attribute = device_class.key();
        let value = state
            .attribute(attribute)
            .ok_or_else(|| SensorError::AttributeMissing {
                entity_id: entity_id.clone(),
                attribute: attribute.to_string(),
            })?;

        match value {
            serde_json::Value::String(text) => {
                let (value, unit) = extract_value_unit(text)?;
                Ok((SensorValue::Float(value), unit))
            }
            serde_json::Value::Number(number) => {
                let value = match number.as_i64() {
                    Some(int) => SensorValue::Integer(int),
                    None => SensorValue::Float(number.as_f64().unwrap_or_default()),
                };
                Ok((value, String::new()))
            }
            other => Err(SensorError::InvalidAttribute {
                entity_id,
                attribute: attribute.to_string(),
                value: other.clone(),
            }),
        }
    }
}

#[async_trait]
impl Entity for MobileAlertsSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    fn state(&self) -> Option<SensorValue> {
        self.state
    }

    fn unit_of_measurement(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    fn extra_state_attributes(&self) -> HashMap<String, serde_json::Value> {
        self.attributes.clone()
    }

    fn update_before_add(&self) -> bool {
        self.is_historic()
    }

    #[instrument(skip(self), fields(entity_id = %self.entity_id))]
    async fn update(&mut self) -> SensorResult<()> {
        match &mut self.source {
            Source::Historic(fetcher) => {
                fetcher.update().await?;
                self.state = fetcher.data();
                self.unit = fetcher.unit().map(str::to_string);
            }
            Source::Current {
                device_class,
                weather,
                states,
            } => {
                let (value, unit) = Self::read_weather(*device_class, weather, &**states)?;
                self.state = Some(value);
                self.unit = Some(unit);
            }
        }

        debug!(state = ?self.state, unit = ?self.unit, "Sensor updated");
        Ok(())
    }
}

impl fmt::Debug for MobileAlertsSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.is_historic() { "historic" } else { "current" };
        f.debug_struct("MobileAlertsSensor")
            .field("name", &self.name)
            .field("entity_id", &self.entity_id)
            .field("mode", &mode)
            .field("state", &self.state)
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ma_core::attributes::{ATTR_FRIENDLY_NAME, ATTR_UNIT_OF_MEASUREMENT};
    use ma_core::StateStore;
    use serde_json::json;

    fn weather_store(attributes: serde_json::Value) -> Arc<StateStore> {
        let store = Arc::new(StateStore::new());
        let attributes = attributes
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        store.set(EntityId::new("weather", "garden").unwrap(), "sunny", attributes);
        store
    }

    fn garden() -> EntityId {
        "weather.garden".parse().unwrap()
    }

    #[tokio::test]
    async fn test_current_mode_reads_decorated_attribute() {
        let store = weather_store(json!({"temperature": "12.3 C", "humidity": "55%"}));
        let mut sensor = MobileAlertsSensor::current(
            "ma_temperature",
            DeviceClass::Temperature,
            garden(),
            store.clone(),
        )
        .unwrap();

        assert!(!sensor.update_before_add());
        assert_eq!(sensor.state(), None);

        sensor.update().await.unwrap();
        assert_eq!(sensor.state(), Some(SensorValue::Float(12.3)));
        assert_eq!(sensor.unit_of_measurement(), Some("C"));
        assert_eq!(sensor.entity_id().to_string(), "sensor.ma_temperature");
    }

    #[tokio::test]
    async fn test_current_mode_follows_weather_changes() {
        let store = weather_store(json!({"humidity": "55%"}));
        let mut sensor = MobileAlertsSensor::current(
            "ma_humidity",
            DeviceClass::Humidity,
            garden(),
            store.clone(),
        )
        .unwrap();

        sensor.update().await.unwrap();
        assert_eq!(sensor.state(), Some(SensorValue::Float(55.0)));

        store.set(
            garden(),
            "rainy",
            HashMap::from([("humidity".to_string(), json!("81%"))]),
        );
        sensor.update().await.unwrap();
        assert_eq!(sensor.state(), Some(SensorValue::Float(81.0)));
        assert_eq!(sensor.unit_of_measurement(), Some("%"));
    }

    #[tokio::test]
    async fn test_current_mode_numeric_attribute() {
        let store = weather_store(json!({"pressure": 1013}));
        let mut sensor =
            MobileAlertsSensor::current("ma_pressure", DeviceClass::Pressure, garden(), store)
                .unwrap();

        sensor.update().await.unwrap();
        assert_eq!(sensor.state(), Some(SensorValue::Integer(1013)));
        assert_eq!(sensor.unit_of_measurement(), Some(""));
        assert!(!sensor
            .state_attributes()
            .contains_key(ATTR_UNIT_OF_MEASUREMENT));
    }

    #[tokio::test]
    async fn test_current_mode_errors() {
        let store = weather_store(json!({"temperature": "12.3 C", "rain": null}));

        let mut missing = MobileAlertsSensor::current(
            "ma_snow",
            DeviceClass::Snow,
            garden(),
            store.clone(),
        )
        .unwrap();
        assert!(matches!(
            missing.update().await,
            Err(SensorError::AttributeMissing { .. })
        ));

        let mut null = MobileAlertsSensor::current(
            "ma_rain",
            DeviceClass::Rain,
            garden(),
            store.clone(),
        )
        .unwrap();
        assert!(matches!(
            null.update().await,
            Err(SensorError::InvalidAttribute { .. })
        ));

        let mut gone = MobileAlertsSensor::current(
            "ma_temperature",
            DeviceClass::Temperature,
            "weather.balcony".parse().unwrap(),
            store,
        )
        .unwrap();
        match gone.update().await {
            Err(SensorError::WeatherEntityNotFound(id)) => assert_eq!(id, "weather.balcony"),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(gone.state(), None);
    }

    #[test]
    fn test_attribution() {
        let store = weather_store(json!({}));
        let sensor =
            MobileAlertsSensor::current("MA Wind", DeviceClass::WindSpeed, garden(), store)
                .unwrap();

        let attributes = sensor.state_attributes();
        assert_eq!(
            attributes[ATTR_ATTRIBUTION],
            json!("Data provided by weather.garden")
        );
        assert_eq!(attributes[ATTR_FRIENDLY_NAME], json!("MA Wind"));
        assert_eq!(sensor.entity_id().to_string(), "sensor.ma_wind");
        assert_eq!(sensor.device_class(), DeviceClass::WindSpeed);
        assert_eq!(attribution(DEFAULT_SOURCE), "Data provided by MobileAlerts");
    }
}
