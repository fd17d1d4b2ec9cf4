//! Entity host: platform setup, update cycle and state publishing

use anyhow::{Context, Result};
use ma_config::{Configuration, PlatformConfig};
use ma_core::attributes::ATTR_FRIENDLY_NAME;
use ma_core::{
    SharedStateStore, State, StateLookup, StateStore, SENSOR_DOMAIN, STATE_UNAVAILABLE,
    STATE_UNKNOWN,
};
use ma_sensor::{setup_platform, Entity};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Owns the state store and every sensor entity
pub struct Host {
    pub states: SharedStateStore,
    entities: Vec<Box<dyn Entity>>,
}

impl Host {
    pub fn new() -> Self {
        Self {
            states: Arc::new(StateStore::new()),
            entities: Vec::new(),
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Load entity states from a JSON list, e.g. the weather entities
    /// current-mode sensors read from
    pub fn seed_states(&self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading states file {}", path.display()))?;
        let seeded: Vec<State> = serde_json::from_str(&content)
            .with_context(|| format!("parsing states file {}", path.display()))?;

        let count = seeded.len();
        for state in seeded {
            self.states.insert(state);
        }
        info!("Seeded {} entity states from {}", count, path.display());
        Ok(count)
    }

    /// Set up every `mobilealerts` entry; a failing entry is logged and skipped
    pub async fn setup(&mut self, config: &Configuration) -> Result<()> {
        let time_zone = config.core.tz()?;

        for (index, entry) in config.platforms.iter().enumerate() {
            let platform = match PlatformConfig::from_yaml(entry) {
                Ok(platform) => platform,
                Err(e) => {
                    error!("Invalid mobilealerts entry #{}: {}", index, e);
                    continue;
                }
            };

            match setup_platform(&platform, time_zone, self.states.clone()) {
                Ok(sensors) => {
                    for sensor in sensors {
                        self.add_entity(Box::new(sensor)).await;
                    }
                }
                Err(e) => error!("Error setting up platform {}: {}", platform.name, e),
            }
        }

        info!("{} sensor entities set up", self.entities.len());
        Ok(())
    }

    /// Register an entity and publish its first state
    pub async fn add_entity(&mut self, mut entity: Box<dyn Entity>) {
        if entity.update_before_add() {
            if let Err(e) = entity.update().await {
                warn!("Initial update of {} failed: {}", entity.entity_id(), e);
                self.write_unavailable(&*entity);
                self.entities.push(entity);
                return;
            }
        }

        self.write_state(&*entity);
        self.entities.push(entity);
    }

    /// Update every entity in order and publish the results
    #[instrument(skip(self), fields(entities = self.entities.len()))]
    pub async fn update_all(&mut self) {
        let states = self.states.clone();
        for entity in self.entities.iter_mut() {
            match entity.update().await {
                Ok(()) => publish(&states, &**entity),
                Err(e) => {
                    error!("Error updating {}: {}", entity.entity_id(), e);
                    publish_unavailable(&states, &**entity);
                }
            }
        }
    }

    /// Published states of all sensor entities, sorted by entity id
    pub fn sensor_states(&self) -> Vec<State> {
        let mut ids = self.states.entity_ids(SENSOR_DOMAIN);
        ids.sort();
        ids.iter()
            .filter_map(|id| self.states.get(id))
            .collect()
    }

    fn write_state(&self, entity: &dyn Entity) {
        publish(&self.states, entity);
    }

    fn write_unavailable(&self, entity: &dyn Entity) {
        publish_unavailable(&self.states, entity);
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

fn publish(states: &StateStore, entity: &dyn Entity) {
    let value = entity
        .state()
        .map(|value| value.to_string())
        .unwrap_or_else(|| STATE_UNKNOWN.to_string());
    debug!("{} -> {}", entity.entity_id(), value);
    states.set(entity.entity_id().clone(), value, entity.state_attributes());
}

fn publish_unavailable(states: &StateStore, entity: &dyn Entity) {
    let mut attributes = entity.extra_state_attributes();
    attributes.insert(
        ATTR_FRIENDLY_NAME.to_string(),
        serde_json::Value::from(entity.name()),
    );
    states.set(entity.entity_id().clone(), STATE_UNAVAILABLE, attributes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ma_config::{HistoricConfig, Secrets, YamlLoader};
    use ma_core::{AggregationMethod, DeviceClass};
    use ma_history::DataFetcher;
    use ma_sensor::MobileAlertsSensor;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use tempfile::TempDir;

    const HISTORY_PATH: &str = "/Home/MeasurementDetails";

    const HISTORY_PAGE: &str = r#"
<table>
  <thead><tr><th>Time</th><th>Temperature</th></tr></thead>
  <tbody>
    <tr><td>10.03.2024 12:30</td><td>21.7 C</td></tr>
    <tr><td>10.03.2024 12:00</td><td>19.4 C</td></tr>
  </tbody>
</table>
"#;

    fn historic_sensor(server: &ServerGuard) -> Box<MobileAlertsSensor> {
        let config = HistoricConfig {
            device_id: "0E7EA4A71203".to_string(),
            device_class: DeviceClass::Temperature,
            method: AggregationMethod::Maximum,
            duration_hours: 24,
        };
        let fetcher = DataFetcher::new(&config, chrono_tz::UTC)
            .unwrap()
            .with_base_url(format!("{}{}", server.url(), HISTORY_PATH));
        Box::new(MobileAlertsSensor::historic("Garden max", fetcher).unwrap())
    }

    const WEATHER_STATES: &str = r#"[
        {
            "entity_id": "weather.garden",
            "state": "sunny",
            "attributes": {"temperature": "12.3 C", "humidity": "55%"}
        }
    ]"#;

    fn configuration(yaml: &str) -> Configuration {
        let mut loader = YamlLoader::with_secrets(".", Secrets::default());
        let root = loader
            .load_string(yaml, Path::new("configuration.yaml"))
            .unwrap();
        Configuration::from_yaml(&root).unwrap()
    }

    fn seeded_host() -> (Host, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("states.json");
        std::fs::write(&path, WEATHER_STATES).unwrap();

        let host = Host::new();
        assert_eq!(host.seed_states(&path).unwrap(), 1);
        (host, dir)
    }

    #[tokio::test]
    async fn test_setup_and_publish_current_sensors() {
        let (mut host, _dir) = seeded_host();
        let config = configuration(
            r#"
sensor:
  - platform: mobilealerts
    name: MA
    mode: current
    weather: weather.garden
    devices: [temperature, humidity]
  - platform: template
    name: ignored
"#,
        );

        host.setup(&config).await.unwrap();
        assert_eq!(host.entity_count(), 2);

        // Current sensors are published before their first update
        let state = host.states.get("sensor.ma_temperature").unwrap();
        assert_eq!(state.state, STATE_UNKNOWN);

        host.update_all().await;
        let state = host.states.get("sensor.ma_temperature").unwrap();
        assert_eq!(state.state, "12.3");
        assert_eq!(state.attributes["unit_of_measurement"], json!("C"));
        assert_eq!(
            state.attributes["attribution"],
            json!("Data provided by weather.garden")
        );
        assert_eq!(host.states.get("sensor.ma_humidity").unwrap().state, "55.0");
        assert_eq!(host.sensor_states().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_update_marks_unavailable() {
        let (mut host, _dir) = seeded_host();
        let config = configuration(
            r#"
sensor:
  - platform: mobilealerts
    name: MA
    weather: weather.garden
    devices: temperature
"#,
        );
        host.setup(&config).await.unwrap();

        host.states.remove("weather.garden");
        host.update_all().await;

        let state = host.states.get("sensor.ma_temperature").unwrap();
        assert!(state.is_unavailable());
        assert_eq!(state.attributes["friendly_name"], json!("ma_temperature"));
        assert_eq!(
            state.attributes["attribution"],
            json!("Data provided by weather.garden")
        );
    }

    #[tokio::test]
    async fn test_bad_entries_are_skipped() {
        let mut host = Host::new();
        let config = configuration(
            r#"
sensor:
  - platform: mobilealerts
    name: Missing weather
    weather: weather.nowhere
    devices: [rain]
  - platform: mobilealerts
    name: No method
    device_id: 0E7EA4A71203
    device_class: rain
"#,
        );

        host.setup(&config).await.unwrap();
        assert_eq!(host.entity_count(), 0);
        assert!(host.sensor_states().is_empty());
    }

    #[test]
    fn test_seed_states_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("states.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Host::new().seed_states(&path).unwrap_err();
        assert!(err.to_string().contains("parsing states file"));
    }

    #[tokio::test]
    async fn test_historic_sensor_updated_before_first_publish() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", HISTORY_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(HISTORY_PAGE)
            .create_async()
            .await;

        let mut host = Host::new();
        host.add_entity(historic_sensor(&server)).await;

        let state = host.states.get("sensor.garden_max").unwrap();
        assert_eq!(state.state, "21.7");
        assert_eq!(state.attributes["unit_of_measurement"], json!("C"));
        assert_eq!(
            state.attributes["attribution"],
            json!("Data provided by MobileAlerts")
        );
        assert_eq!(host.entity_count(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_initial_update_publishes_unavailable() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", HISTORY_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let mut host = Host::new();
        host.add_entity(historic_sensor(&server)).await;

        let state = host.states.get("sensor.garden_max").unwrap();
        assert!(state.is_unavailable());
        assert_eq!(state.attributes["friendly_name"], json!("Garden max"));
        assert_eq!(
            state.attributes["attribution"],
            json!("Data provided by MobileAlerts")
        );
        // The entity is kept so later passes can recover
        assert_eq!(host.entity_count(), 1);
        mock.assert_async().await;
    }
}
