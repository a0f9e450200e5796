use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Identity, Role};
use crate::utils::value::value_to_opt_string;

/// Why a credential could not be turned into an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Wrong segment count, empty segment, bad base64url or bad JSON.
    #[error("Malformed credential: {0}")]
    Malformed(String),
    /// Well-formed claims that lack `identity.role` or carry an unknown role.
    #[error("Credential is missing identity claims: {0}")]
    MissingClaims(String),
}

/// Decode a credential into the identity it carries.
///
/// Pure and infallible in the panic sense: every input yields either an
/// identity or a [`DecodeError`]. The signature segment is not checked.
pub fn decode(credential: &str) -> Result<Identity, DecodeError> {
    let claims = decode_claims(credential)?;
    identity_from_claims(&claims)
}

/// Decode only the claims object of a credential.
pub fn decode_claims(credential: &str) -> Result<Map<String, Value>, DecodeError> {
    let segments: Vec<&str> = credential.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(DecodeError::Malformed("empty segment".to_string()));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(normalize_segment(segments[1]))
        .map_err(|e| DecodeError::Malformed(format!("claims segment is not base64url: {}", e)))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(DecodeError::Malformed(
            "claims segment is not a JSON object".to_string(),
        )),
        Err(e) => Err(DecodeError::Malformed(format!(
            "claims segment is not JSON: {}",
            e
        ))),
    }
}

/// Drop padding and map the standard alphabet onto the URL-safe one,
/// so tokens produced by either encoder decode the same way.
fn normalize_segment(segment: &str) -> String {
    segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

/// Claims layout: `{"identity": {"id", "role", "name", "email"}, "sub", ...}`.
/// Name and email may also sit at the top level.
fn identity_from_claims(claims: &Map<String, Value>) -> Result<Identity, DecodeError> {
    let identity = claims
        .get("identity")
        .and_then(Value::as_object)
        .ok_or_else(|| DecodeError::MissingClaims("no 'identity' object".to_string()))?;

    let role: Role = identity
        .get("role")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::MissingClaims("no 'identity.role' string".to_string()))?
        .parse::<Role>()
        .map_err(|e| DecodeError::MissingClaims(e.to_string()))?;

    let lookup = |key: &str| claim(identity, key).or_else(|| claim(claims, key));

    Ok(Identity::new(
        role,
        claim(identity, "id").or_else(|| claim(claims, "sub")),
        lookup("name"),
        lookup("email"),
    ))
}

fn claim(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).cloned().and_then(value_to_opt_string)
}
