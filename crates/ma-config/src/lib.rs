//! Configuration for the Mobile Alerts sensor platform
//!
//! Loads `configuration.yaml` (with `!include`, `!secret` and `!env_var`
//! support), reads the core `homeassistant:` section and validates every
//! `sensor:` entry whose platform is `mobilealerts`.
//!
//! # Example
//!
//! ```ignore
//! use ma_config::{Configuration, PlatformConfig};
//!
//! let config = Configuration::load("/config")?;
//! let tz = config.core.tz()?;
//! for entry in &config.platforms {
//!     let platform = PlatformConfig::from_yaml(entry)?;
//! }
//! ```

mod core_config;
mod error;
mod loader;
mod platform;
mod secrets;

use std::path::Path;

pub use core_config::{parse_time_zone, CoreConfig};
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, YamlLoader};
pub use platform::{
    platform_entries, CurrentConfig, HistoricConfig, PlatformConfig, SensorMode, SensorSource,
    DEFAULT_DURATION_HOURS, PLATFORM,
};
pub use secrets::Secrets;

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;

/// Name of the main configuration file inside the config directory
pub const CONFIG_FILE: &str = "configuration.yaml";

/// Everything the host needs from configuration.yaml
///
/// Platform entries stay unvalidated here so one bad entry does not prevent
/// the others from being set up.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub core: CoreConfig,
    pub platforms: Vec<Value>,
}

impl Configuration {
    /// Load configuration.yaml from a config directory
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let root = load_yaml(config_dir.as_ref(), CONFIG_FILE)?;
        Self::from_yaml(&root)
    }

    pub fn from_yaml(root: &Value) -> ConfigResult<Self> {
        Ok(Self {
            core: CoreConfig::from_yaml(root)?,
            platforms: platform_entries(root),
        })
    }
}
