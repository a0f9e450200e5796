use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Convert arbitrary JSON values into sanitized strings.
///
/// The backend mixes integer and UUID identifiers, so ids and claim values
/// are normalized to strings before they reach the rest of the crate.
pub fn value_to_string(value: Value) -> String {
    let raw = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    };
    sanitize(raw)
}

/// Like [`value_to_string`], but JSON `null` and empty strings become `None`.
pub fn value_to_opt_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(value_to_string(other)).filter(|s| !s.is_empty()),
    }
}

fn sanitize(s: String) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

/// Serde helper for id fields that arrive as either numbers or strings.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_string)
}

/// Like [`lenient_string`], but `null` becomes an empty string.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| value_to_opt_string(v).unwrap_or_default())
}

/// Optional variant of [`lenient_string`]; use with `#[serde(default)]`.
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_opt_string)
}
