//! YAML configuration loader with custom tag support
//!
//! Supported tags:
//! - `!include path` - Include another YAML file
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR [default]` - Environment variable substitution

use crate::error::{ConfigError, ConfigResult};
use crate::secrets::Secrets;
use serde_yaml::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader resolving includes, secrets and environment variables
pub struct YamlLoader {
    /// Base directory for resolving relative paths
    config_dir: PathBuf,
    secrets: Secrets,
    /// Files currently being loaded, to detect circular includes
    include_stack: HashSet<PathBuf>,
}

impl YamlLoader {
    /// Create a new YAML loader for the given config directory
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let secrets = Secrets::load(&config_dir)?;

        Ok(Self::with_secrets(config_dir, secrets))
    }

    /// Create a loader with pre-loaded secrets
    pub fn with_secrets(config_dir: impl Into<PathBuf>, secrets: Secrets) -> Self {
        Self {
            config_dir: config_dir.into(),
            secrets,
            include_stack: HashSet::new(),
        }
    }

    /// Load and process a YAML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.resolve_path(path.as_ref());
        debug!("Loading YAML file: {:?}", path);

        if self.include_stack.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.include_stack.insert(path.clone());
        let result = self.load_string(&content, &path);
        self.include_stack.remove(&path);

        result
    }

    /// Load and process YAML from a string
    pub fn load_string(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        self.process_value(value, source_path)
    }

    fn process_value(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => self.process_tagged(*tagged, source_path),
            Value::Mapping(map) => {
                let mut result = serde_yaml::Mapping::new();
                for (k, v) in map {
                    let processed_value = self.process_value(v, source_path)?;
                    result.insert(k, processed_value);
                }
                Ok(Value::Mapping(result))
            }
            Value::Sequence(seq) => {
                let result: ConfigResult<Vec<Value>> = seq
                    .into_iter()
                    .map(|v| self.process_value(v, source_path))
                    .collect();
                Ok(Value::Sequence(result?))
            }
            _ => Ok(value),
        }
    }

    fn process_tagged(
        &mut self,
        tagged: serde_yaml::value::TaggedValue,
        source_path: &Path,
    ) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        trace!("Processing tag '{}' with value {:?}", tag, tagged.value);

        match tag.as_str() {
            "!include" => {
                let include_path = self.tag_argument(&tag, &tagged.value)?;
                let include_path = source_path
                    .parent()
                    .unwrap_or(self.config_dir.as_path())
                    .join(include_path);
                if !include_path.exists() {
                    return Err(ConfigError::IncludeNotFound { path: include_path });
                }
                debug!("Including file: {:?}", include_path);
                self.load_file(include_path)
            }
            "!secret" => {
                let key = self.tag_argument(&tag, &tagged.value)?;
                let secret = self.secrets.get(&key)?;
                debug!("Substituted secret: {}", key);
                Ok(Value::String(secret.to_string()))
            }
            "!env_var" => {
                let arg = self.tag_argument(&tag, &tagged.value)?;
                let (var, default) = match arg.split_once(char::is_whitespace) {
                    Some((var, default)) => (var.to_string(), Some(default.trim().to_string())),
                    None => (arg.clone(), None),
                };
                match (std::env::var(&var), default) {
                    (Ok(value), _) => Ok(Value::String(value)),
                    (Err(_), Some(default)) => Ok(Value::String(default)),
                    (Err(_), None) => Err(ConfigError::EnvVarNotFound { var }),
                }
            }
            _ => {
                // Unknown tags pass through untouched
                let processed = self.process_value(tagged.value, source_path)?;
                Ok(Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
                    tag: tagged.tag,
                    value: processed,
                })))
            }
        }
    }

    fn tag_argument(&self, tag: &str, value: &Value) -> ConfigResult<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(ConfigError::InvalidValue {
                key: tag.to_string(),
                reason: "tag argument must be a string".to_string(),
            }),
        }
    }

    /// Resolve a path relative to the config directory
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

/// Load a YAML file with full tag processing
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    let mut loader = YamlLoader::new(config_dir)?;
    loader.load_file(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn key(map: &Value, name: &str) -> Value {
        map.as_mapping()
            .unwrap()
            .get(Value::String(name.to_string()))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_include_sensor_list() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "sensors.yaml",
            "- platform: mobilealerts\n  name: Garden\n",
        );
        write_file(dir.path(), "configuration.yaml", "sensor: !include sensors.yaml\n");

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        let sensors = key(&value, "sensor");
        assert_eq!(sensors.as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_include() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "configuration.yaml", "sensor: !include nope.yaml\n");

        let result = load_yaml(dir.path(), "configuration.yaml");
        assert!(matches!(result, Err(ConfigError::IncludeNotFound { .. })));
    }

    #[test]
    fn test_secret_device_id() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "garden_id: 0E7EA4A71203\n");
        write_file(dir.path(), "configuration.yaml", "device_id: !secret garden_id\n");

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        assert_eq!(
            key(&value, "device_id"),
            Value::String("0E7EA4A71203".to_string())
        );
    }

    #[test]
    fn test_env_var_with_default() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("MA_CONFIG_TEST_TZ", "Europe/Prague");
        write_file(
            dir.path(),
            "configuration.yaml",
            "tz: !env_var MA_CONFIG_TEST_TZ\nfallback: !env_var MA_CONFIG_TEST_UNSET UTC\n",
        );

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        assert_eq!(key(&value, "tz"), Value::String("Europe/Prague".to_string()));
        assert_eq!(key(&value, "fallback"), Value::String("UTC".to_string()));

        std::env::remove_var("MA_CONFIG_TEST_TZ");
    }

    #[test]
    fn test_env_var_missing() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "configuration.yaml",
            "tz: !env_var MA_CONFIG_TEST_NEVER_SET\n",
        );

        let result = load_yaml(dir.path(), "configuration.yaml");
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound { .. })));
    }

    #[test]
    fn test_circular_include_detection() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.yaml", "b: !include b.yaml\n");
        write_file(dir.path(), "b.yaml", "a: !include a.yaml\n");

        let result = load_yaml(dir.path(), "a.yaml");
        assert!(matches!(result, Err(ConfigError::CircularInclude { .. })));
    }
}
