//! Entity ID type representing a domain.object_id pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain used for every entity this platform creates
pub const SENSOR_DOMAIN: &str = "sensor";

/// Error type for invalid entity IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityIdError {
    #[error("entity_id must contain exactly one '.' separator")]
    InvalidFormat,

    #[error("domain cannot be empty")]
    EmptyDomain,

    #[error("object_id cannot be empty")]
    EmptyObjectId,

    #[error("domain contains invalid characters (must be lowercase alphanumeric with underscores)")]
    InvalidDomainChars,

    #[error(
        "object_id contains invalid characters (must be lowercase alphanumeric with underscores)"
    )]
    InvalidObjectIdChars,

    #[error("name '{0}' does not contain any character usable in an object_id")]
    UnsluggableName(String),
}

/// An entity ID such as `weather.garden` or `sensor.ma_temperature`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    domain: String,
    object_id: String,
}

impl EntityId {
    /// Create a new EntityId from domain and object_id parts
    pub fn new(
        domain: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Result<Self, EntityIdError> {
        let domain = domain.into();
        let object_id = object_id.into();

        if domain.is_empty() {
            return Err(EntityIdError::EmptyDomain);
        }
        if object_id.is_empty() {
            return Err(EntityIdError::EmptyObjectId);
        }
        if domain.contains("__") || !is_valid_part(&domain) {
            return Err(EntityIdError::InvalidDomainChars);
        }
        if !is_valid_part(&object_id) {
            return Err(EntityIdError::InvalidObjectIdChars);
        }

        Ok(Self { domain, object_id })
    }

    /// Build the `sensor.<slug>` id for a display name
    ///
    /// `"MA Garden"` becomes `sensor.ma_garden`.
    pub fn sensor_for_name(name: &str) -> Result<Self, EntityIdError> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(EntityIdError::UnsluggableName(name.to_string()));
        }
        Self::new(SENSOR_DOMAIN, slug)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }
}

/// Lowercase alphanumeric + underscore, not starting or ending with `_`
fn is_valid_part(s: &str) -> bool {
    if s.starts_with('_') || s.ends_with('_') {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Turn a free-form display name into an object_id
///
/// Runs of anything that is not ASCII alphanumeric collapse into a single
/// underscore; leading and trailing underscores are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    slug
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((domain, object_id)) if !object_id.contains('.') => Self::new(domain, object_id),
            _ => Err(EntityIdError::InvalidFormat),
        }
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> String {
        id.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weather_entity() {
        let id: EntityId = "weather.garden".parse().unwrap();
        assert_eq!(id.domain(), "weather");
        assert_eq!(id.object_id(), "garden");
        assert_eq!(id.to_string(), "weather.garden");
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(
            "no_separator".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidFormat
        );
        assert_eq!(
            "too.many.parts".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidFormat
        );
        assert_eq!(
            ".garden".parse::<EntityId>().unwrap_err(),
            EntityIdError::EmptyDomain
        );
        assert_eq!(
            "weather.Garden".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidObjectIdChars
        );
        assert_eq!(
            "my__weather.garden".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidDomainChars
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("MA Garden"), "ma_garden");
        assert_eq!(slugify("ma_temperature"), "ma_temperature");
        assert_eq!(slugify("  Rain (24h) -- max "), "rain_24h_max");
        assert_eq!(slugify("°°°"), "");
    }

    #[test]
    fn test_sensor_for_name() {
        let id = EntityId::sensor_for_name("Garden Max Temp").unwrap();
        assert_eq!(id.to_string(), "sensor.garden_max_temp");

        assert_eq!(
            EntityId::sensor_for_name("%%").unwrap_err(),
            EntityIdError::UnsluggableName("%%".to_string())
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = EntityId::new("weather", "balcony").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"weather.balcony\"");

        let parsed: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
