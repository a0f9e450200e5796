use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;

/// Environment variables with this prefix override file values,
/// e.g. `VITRINE_API__BASE_URL`.
pub const ENV_PREFIX: &str = "VITRINE_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub password_reset: PasswordResetConfig,
    #[serde(default)]
    pub email_relay: Option<EmailRelayConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load config from a YAML file, with `VITRINE_*` environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    from_figment(
        Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__")),
    )
}

/// Extract a configuration from an already assembled figment.
pub fn from_figment(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Render the JSON schema for the configuration.
pub fn schema_json() -> String {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Backend REST API location.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    /// Base URL without the `/api` suffix, e.g. `http://localhost:5000`.
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

/// Where reset links sent by email point to.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct PasswordResetConfig {
    /// Origin of the web front end, e.g. `http://localhost:5173`.
    pub origin: String,
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5173".to_string(),
        }
    }
}

/// EmailJS credentials used to deliver password reset links.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct EmailRelayConfig {
    #[serde(default = "default_relay_url")]
    pub url: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct CacheConfig {
    /// Lifetime of cached project details.
    #[serde(default = "default_project_ttl")]
    pub project_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            project_ttl_seconds: default_project_ttl(),
        }
    }
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

fn default_relay_url() -> String {
    "https://api.emailjs.com/api/v1.0/email/send".to_string()
}

fn default_project_ttl() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogFormat, StorageBackend};

    const MINIMAL: &str = r#"
version: "1.0.0"
api:
  base_url: "http://localhost:5000"
"#;

    const FULL: &str = r#"
version: "1.0.0"
api:
  base_url: "https://vitrine.example"
  timeout_in_ms: 2500
storage:
  enabled: true
  type: file
  path: "/tmp/vitrine-session.json"
password_reset:
  origin: "https://app.vitrine.example"
email_relay:
  service_id: "service_x"
  template_id: "template_y"
  public_key: "pk"
  timeout_in_ms: 4000
cache:
  project_ttl_seconds: 5
logging:
  level: debug
  format: json
"#;

    fn parse(yaml: &str) -> Result<ConfigV1, figment::Error> {
        from_figment(Figment::new().merge(Yaml::string(yaml)))
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config = parse(MINIMAL).expect("minimal config should parse");
        assert_eq!(config.api.timeout_in_ms, 10_000);
        assert!(config.storage.enabled);
        assert_eq!(config.storage.backend, Some(StorageBackend::Memory));
        assert!(config.email_relay.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Console);
        assert_eq!(config.cache.project_ttl_seconds, 60);
    }

    #[test]
    fn full_config_is_read() {
        let config = parse(FULL).expect("full config should parse");
        assert_eq!(config.api.timeout_in_ms, 2500);
        match config.storage.backend {
            Some(StorageBackend::File(file)) => {
                assert_eq!(file.path.to_str(), Some("/tmp/vitrine-session.json"))
            }
            other => panic!("expected file backend, got {:?}", other),
        }
        let relay = config.email_relay.expect("relay configured");
        assert_eq!(relay.url, "https://api.emailjs.com/api/v1.0/email/send");
        assert_eq!(relay.service_id, "service_x");
        assert_eq!(relay.timeout_in_ms, 4000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.password_reset.origin, "https://app.vitrine.example");
    }

    #[test]
    fn unknown_version_is_rejected() {
        let yaml = MINIMAL.replace("1.0.0", "9.9.9");
        assert!(parse(&yaml).is_err());
    }

    #[test]
    fn schema_mentions_api_section() {
        let schema = schema_json();
        assert!(schema.contains("base_url"));
    }
}
