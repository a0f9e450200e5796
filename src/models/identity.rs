use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two tenant roles. Every route and landing page is derived from it.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Provider,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 2] = [Role::Client, Role::Provider];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Exact, case-sensitive match: the backend only ever emits lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "provider" => Ok(Role::Provider),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The decoded user attributes carried by a credential.
///
/// Only `role` is guaranteed; the backend currently puts `id` and `role`
/// in the token and leaves name and email to the profile endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

impl Identity {
    pub fn new(
        role: Role,
        subject_id: Option<String>,
        display_name: Option<String>,
        email: Option<String>,
    ) -> Self {
        Identity {
            subject_id,
            display_name,
            email,
            role,
        }
    }

    /// Name to greet the user with: display name, then email, then a generic label.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(match self.role {
                Role::Client => "Client",
                Role::Provider => "Provider",
            })
    }
}
