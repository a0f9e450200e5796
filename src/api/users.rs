use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;
use crate::models::Role;
use crate::token::Credential;
use crate::utils::value::{lenient_opt_string, lenient_string};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Fields left as `None` are not sent.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ApiClient {
    pub async fn profile(&self, credential: &Credential) -> Result<UserProfile, ApiError> {
        let request = self.request(Method::GET, "users/profile", Some(credential));
        self.execute_json(request, "users.profile").await
    }

    pub async fn update_profile(
        &self,
        credential: &Credential,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let request = self
            .request(Method::PUT, "users/profile", Some(credential))
            .json(update);
        self.execute_json(request, "users.profile.update").await
    }
}

#[cfg(test)]
mod tests {
    use super::super::client::tests::client_for;
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn profile_update_sends_only_set_fields() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PUT", "/api/users/profile")
            .match_body(Matcher::Json(json!({"name": "Ana María"})))
            .with_status(200)
            .with_body(r#"{"id": 7, "name": "Ana María", "email": "ana@example.com", "role": "client"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let profile = client
            .update_profile(
                &Credential::new("h.p.s"),
                &ProfileUpdate {
                    name: Some("Ana María".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(profile.id, "7");
        assert_eq!(profile.role, Some(Role::Client));
    }
}
