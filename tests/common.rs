#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use vitrine::config::{from_figment, ConfigV1};
use vitrine::startup::build_state;
use vitrine::state::AppState;

pub fn config_from_yaml(yaml: &str) -> ConfigV1 {
    from_figment(Figment::new().merge(Yaml::string(yaml))).expect("test config should parse")
}

/// Config pointing at `api_url`, persisting the session to `session_file`.
pub fn test_config(api_url: &str, session_file: &PathBuf) -> ConfigV1 {
    config_from_yaml(&format!(
        r#"
version: "1.0.0"
api:
  base_url: "{api_url}"
  timeout_in_ms: 2000
storage:
  enabled: true
  type: file
  path: "{path}"
password_reset:
  origin: "https://app.vitrine.test"
logging:
  level: "debug"
  format: "json"
"#,
        api_url = api_url,
        path = session_file.display()
    ))
}

pub fn build(config: ConfigV1) -> AppState {
    build_state(Arc::new(config)).expect("state should build")
}

/// A unique session file path under the system temp dir.
pub fn session_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir()
        .join(format!("vitrine-it-{}", std::process::id()))
        .join(format!("{}.json", name));
    let _ = std::fs::remove_file(&path);
    path
}

/// A credential shaped like the ones the backend issues.
pub fn backend_credential(id: &str, role: &str) -> String {
    let claims = json!({
        "fresh": false,
        "iat": 1_732_000_000,
        "jti": format!("jti-{}", id),
        "type": "access",
        "sub": id,
        "nbf": 1_732_000_000,
        "exp": 4_102_444_800u64,
        "identity": {"id": id, "role": role}
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .expect("failed to encode credential")
}
