//! Service configuration loaded from the JSON parameters document
//!
//! The document uses the upstream key names verbatim:
//!
//! ```json
//! {
//!   "TOKEN_CONNECTED": "…",
//!   "VCC_KEY_PRINARY": "…",
//!   "URI": "https://api.volvocars.com/connected-vehicle/v1/vehicles",
//!   "SERVICES": {
//!     "application/vnd.volvocars.api.connected-vehicle.vehiclelist.v1+json": [""],
//!     "application/vnd.volvocars.api.connected-vehicle.doors.v1+json": ["doors"]
//!   }
//! }
//! ```

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{NightguardError, Result};

/// Endpoint name of the account's vehicle list
pub const VEHICLE_LIST: &str = "";

/// Prefix of the endpoint names that carry the `accept` media type of actions
pub const COMMANDS_PREFIX: &str = "commands/";

/// Credentials, base URI and the media-type lookup table
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Access token, sent as `Authorization: Bearer <token>`
    #[serde(rename = "TOKEN_CONNECTED")]
    pub token: String,

    /// Application key, sent as `vcc-api-key`
    #[serde(rename = "VCC_KEY_PRINARY")]
    pub api_key: String,

    /// Base URI; request paths are appended verbatim
    #[serde(rename = "URI")]
    pub base_uri: String,

    /// Media type → endpoint names served with that media type, in
    /// document order
    #[serde(rename = "SERVICES", default)]
    pub services: IndexMap<String, Vec<String>>,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("token", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("base_uri", &self.base_uri)
            .field("services", &self.services)
            .finish()
    }
}

impl ServiceConfig {
    /// Start building a configuration programmatically
    pub fn builder(base_uri: impl Into<String>) -> ServiceConfigBuilder {
        ServiceConfigBuilder::new(base_uri)
    }

    /// Load the configuration from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse the configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| NightguardError::Config(e.to_string()))
    }

    /// Resolve an endpoint name to its media type.
    ///
    /// Returns `None` when no media type lists the endpoint. The empty name
    /// resolves the vehicle list. An endpoint listed under several media
    /// types resolves to the first one in document order.
    pub fn media_type(&self, endpoint: &str) -> Option<&str> {
        self.services
            .iter()
            .find(|(_, names)| names.iter().any(|n| n == endpoint))
            .map(|(media_type, _)| media_type.as_str())
    }

    /// Media type for the `accept` header of an action on `endpoint`
    pub fn command_media_type(&self, endpoint: &str) -> Option<&str> {
        self.media_type(&format!("{}{}", COMMANDS_PREFIX, endpoint))
    }

    /// All endpoint names that have a media type
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.services
            .values()
            .flat_map(|names| names.iter().map(String::as_str))
    }
}

/// Builder for [`ServiceConfig`]
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    token: String,
    api_key: String,
    base_uri: String,
    services: IndexMap<String, Vec<String>>,
}

impl ServiceConfigBuilder {
    fn new(base_uri: impl Into<String>) -> Self {
        Self {
            token: String::new(),
            api_key: String::new(),
            base_uri: base_uri.into(),
            services: IndexMap::new(),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Map an endpoint name to a media type; repeated calls append.
    pub fn service(mut self, media_type: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.services
            .entry(media_type.into())
            .or_default()
            .push(endpoint.into());
        self
    }

    pub fn build(self) -> ServiceConfig {
        ServiceConfig {
            token: self.token,
            api_key: self.api_key,
            base_uri: self.base_uri,
            services: self.services,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DOCUMENT: &str = r#"{
        "TOKEN_CONNECTED": "tok",
        "VCC_KEY_PRINARY": "key",
        "URI": "https://api.example.com/connected-vehicle/v1/vehicles",
        "SERVICES": {
            "application/vnd.volvocars.api.connected-vehicle.vehiclelist.v1+json": [""],
            "application/vnd.volvocars.api.connected-vehicle.vehicledata.v1+json": ["details", "doors", "windows"],
            "application/vnd.volvocars.api.connected-vehicle.lock.v1+json": ["lock"],
            "application/vnd.volvocars.api.connected-vehicle.commands.v1+json": ["commands/lock", "commands/unlock"]
        }
    }"#;

    #[rstest]
    #[case("", Some("application/vnd.volvocars.api.connected-vehicle.vehiclelist.v1+json"))]
    #[case("doors", Some("application/vnd.volvocars.api.connected-vehicle.vehicledata.v1+json"))]
    #[case("windows", Some("application/vnd.volvocars.api.connected-vehicle.vehicledata.v1+json"))]
    #[case("lock", Some("application/vnd.volvocars.api.connected-vehicle.lock.v1+json"))]
    #[case("commands/unlock", Some("application/vnd.volvocars.api.connected-vehicle.commands.v1+json"))]
    #[case("tyres", None)]
    #[case("DOORS", None)]
    fn test_media_type_lookup(#[case] endpoint: &str, #[case] expected: Option<&str>) {
        let config = ServiceConfig::from_json(DOCUMENT).unwrap();
        assert_eq!(config.media_type(endpoint), expected);
    }

    #[test]
    fn test_every_configured_endpoint_resolves_to_its_media_type() {
        let config = ServiceConfig::from_json(DOCUMENT).unwrap();
        for (media_type, names) in &config.services {
            for name in names {
                assert_eq!(config.media_type(name), Some(media_type.as_str()));
            }
        }
    }

    #[test]
    fn test_duplicate_endpoint_resolves_in_document_order() {
        let config = ServiceConfig::from_json(
            r#"{
                "TOKEN_CONNECTED": "tok",
                "VCC_KEY_PRINARY": "key",
                "URI": "https://api.example.com",
                "SERVICES": {
                    "application/z.first+json": ["doors"],
                    "application/a.second+json": ["doors", "windows"]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.media_type("doors"), Some("application/z.first+json"));
        assert_eq!(config.media_type("windows"), Some("application/a.second+json"));
    }

    #[test]
    fn test_command_media_type() {
        let config = ServiceConfig::from_json(DOCUMENT).unwrap();
        assert_eq!(
            config.command_media_type("lock"),
            Some("application/vnd.volvocars.api.connected-vehicle.commands.v1+json")
        );
        assert_eq!(config.command_media_type("honk"), None);
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = ServiceConfig::from_json(r#"{"TOKEN_CONNECTED": "t", "URI": "u"}"#).unwrap_err();
        assert!(matches!(err, NightguardError::Config(msg) if msg.contains("VCC_KEY_PRINARY")));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ServiceConfig::from_json(DOCUMENT).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("tok\""));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_builder_matches_document() {
        let built = ServiceConfig::builder("https://api.example.com/connected-vehicle/v1/vehicles")
            .token("tok")
            .api_key("key")
            .service("application/vnd.volvocars.api.connected-vehicle.lock.v1+json", "lock")
            .build();
        assert_eq!(built.token, "tok");
        assert_eq!(built.endpoints().collect::<Vec<_>>(), vec!["lock"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service_params.json");
        std::fs::write(&path, DOCUMENT).unwrap();

        let config = ServiceConfig::load_from(&path).unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.endpoints().count(), 7);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = ServiceConfig::load_from("/nonexistent/service_params.json").unwrap_err();
        assert!(matches!(err, NightguardError::Io(_)));
    }
}
