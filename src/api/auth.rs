use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::ApiClient;
use super::error::ApiError;
use crate::models::Role;
use crate::token::Credential;
use crate::utils::value::{lenient_opt_string, lenient_string};

#[derive(Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub access_token: Credential,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// The user echo the backend sends next to a fresh credential.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginUser {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub role: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = self
            .request(Method::POST, "login", None)
            .json(&json!({"email": email, "password": password}));
        self.execute_json(request, "login").await
    }

    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let request = self.request(Method::POST, "register", None).json(registration);
        self.execute(request, "register").await?;
        Ok(())
    }

    /// Ask the backend to revoke `credential`.
    pub async fn logout(&self, credential: &Credential) -> Result<(), ApiError> {
        let request = self.request(Method::POST, "logout", Some(credential));
        self.execute(request, "logout").await?;
        Ok(())
    }

    /// The identity object the backend itself reads from `credential`.
    pub async fn verify_token(&self, credential: &Credential) -> Result<Value, ApiError> {
        let request = self.request(Method::POST, "verify-token", Some(credential));
        let body: Value = self.execute_json(request, "verify-token").await?;
        body.get("user")
            .cloned()
            .ok_or_else(|| ApiError::Decode("verify-token: no 'user' field".to_string()))
    }

    pub async fn request_password_reset(
        &self,
        email: &str,
        reset_token: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "request-password-reset", None)
            .json(&json!({"email": email, "resetToken": reset_token}));
        self.execute(request, "request-password-reset").await?;
        Ok(())
    }

    pub async fn verify_reset_token(&self, token: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "verify-reset-token", None)
            .json(&json!({"token": token}));
        self.execute(request, "verify-reset-token").await?;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "reset-password", None)
            .json(&json!({"token": token, "newPassword": new_password}));
        self.execute(request, "reset-password").await?;
        Ok(())
    }
}
