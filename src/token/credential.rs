use std::fmt;

use serde::{Deserialize, Serialize};

use super::codec::{decode, DecodeError};
use crate::models::Identity;

/// An opaque credential string as issued by the backend.
///
/// `Debug` only shows a short prefix so credentials do not leak into logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Credential(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn decode(&self) -> Result<Identity, DecodeError> {
        decode(&self.0)
    }

    /// First few characters, for log lines.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{}…", prefix)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

impl From<String> for Credential {
    fn from(raw: String) -> Self {
        Credential(raw)
    }
}

impl From<&str> for Credential {
    fn from(raw: &str) -> Self {
        Credential(raw.to_string())
    }
}
