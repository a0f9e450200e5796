use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::email_relay::EmailRelay;
use super::error::AuthError;
use crate::api::{ApiClient, ApiError};
use crate::config::PasswordResetConfig;
use crate::guard::Route;

/// The forgot-password handshake.
///
/// The client mints the reset token, registers it with the backend, and
/// emails a link to the reset page. The link's page verifies the token
/// before accepting a new password.
pub struct PasswordReset {
    api: Arc<ApiClient>,
    relay: Arc<dyn EmailRelay>,
    origin: String,
}

impl PasswordReset {
    pub fn new(
        api: Arc<ApiClient>,
        relay: Arc<dyn EmailRelay>,
        config: &PasswordResetConfig,
    ) -> Self {
        Self {
            api,
            relay,
            origin: config.origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn generate_token() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}{}",
            self.origin,
            Route::ResetPassword(token.to_string()).path()
        )
    }

    pub async fn request(&self, email: &str) -> Result<(), AuthError> {
        let token = Self::generate_token();
        let link = self.reset_link(&token);

        self.api
            .request_password_reset(email, &token)
            .await
            .map_err(AuthError::from_api)?;

        self.relay
            .send_reset_link(email, &link)
            .await
            .map_err(|e| {
                warn!(
                    event_name = "auth.password_reset.relay_failed",
                    event_domain = "auth",
                    relay = self.relay.get_name(),
                    "Reset token registered but email not sent: {}",
                    e
                );
                AuthError::EmailRelay(e)
            })?;

        info!(
            event_name = "auth.password_reset.requested",
            event_domain = "auth",
            "Password reset requested"
        );
        Ok(())
    }

    pub async fn verify(&self, token: &str) -> Result<(), AuthError> {
        self.api
            .verify_reset_token(token)
            .await
            .map_err(reset_token_error)
    }

    /// Set a new password. On success the user is sent back home to log in.
    pub async fn complete(
        &self,
        token: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Route, AuthError> {
        if password != confirmation {
            return Err(AuthError::PasswordMismatch);
        }
        self.api
            .reset_password(token, password)
            .await
            .map_err(reset_token_error)?;

        info!(
            event_name = "auth.password_reset.completed",
            event_domain = "auth",
            "Password reset completed"
        );
        Ok(Route::Home)
    }
}

fn reset_token_error(error: ApiError) -> AuthError {
    match error {
        ApiError::Network(e) => AuthError::NetworkFailure(e),
        ApiError::Unauthorized { .. } | ApiError::NotFound(_) => AuthError::InvalidResetToken,
        ApiError::Status { status: 400, .. } => AuthError::InvalidResetToken,
        other => AuthError::Rejected(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::client_for;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRelay {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl EmailRelay for RecordingRelay {
        fn get_name(&self) -> &str {
            "recording"
        }

        async fn send_reset_link(&self, to_email: &str, reset_link: &str) -> Result<(), String> {
            self.sent
                .lock()
                .unwrap()
                .push((to_email.to_string(), reset_link.to_string()));
            Ok(())
        }
    }

    fn reset_for(url: &str, relay: Arc<dyn EmailRelay>) -> PasswordReset {
        PasswordReset::new(
            Arc::new(client_for(url)),
            relay,
            &PasswordResetConfig {
                origin: "https://vitrine.example/".to_string(),
            },
        )
    }

    #[test]
    fn tokens_are_simple_uuids() {
        let token = PasswordReset::generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, PasswordReset::generate_token());
    }

    #[test]
    fn link_points_at_the_reset_route() {
        let reset = reset_for("http://localhost:5000", Arc::new(RecordingRelay::default()));
        let link = reset.reset_link("abc");
        assert_eq!(link, "https://vitrine.example/reset-password/abc");
        assert_eq!(
            Route::parse("/reset-password/abc"),
            Some(Route::ResetPassword("abc".to_string()))
        );
    }

    #[tokio::test]
    async fn request_registers_token_then_emails_link() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/api/request-password-reset")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"email": "ana@example.com"}),
            ))
            .with_status(200)
            .create_async()
            .await;

        let relay = Arc::new(RecordingRelay::default());
        let reset = reset_for(&server.url(), relay.clone());
        reset.request("ana@example.com").await.unwrap();
        m.assert_async().await;

        let sent = relay.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ana@example.com");
        assert!(sent[0].1.starts_with("https://vitrine.example/reset-password/"));
    }

    #[tokio::test]
    async fn backend_refusal_sends_no_email() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/request-password-reset")
            .with_status(500)
            .create_async()
            .await;

        let relay = Arc::new(RecordingRelay::default());
        let reset = reset_for(&server.url(), relay.clone());
        assert!(matches!(
            reset.request("ana@example.com").await,
            Err(AuthError::Rejected(_))
        ));
        assert!(relay.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mismatched_confirmation_never_reaches_backend() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/api/reset-password")
            .expect(0)
            .create_async()
            .await;

        let reset = reset_for(&server.url(), Arc::new(RecordingRelay::default()));
        assert!(matches!(
            reset.complete("tok", "one", "two").await,
            Err(AuthError::PasswordMismatch)
        ));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_invalid() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/verify-reset-token")
            .with_status(400)
            .with_body(r#"{"error": "Token inválido o expirado"}"#)
            .create_async()
            .await;

        let reset = reset_for(&server.url(), Arc::new(RecordingRelay::default()));
        assert!(matches!(
            reset.verify("tok").await,
            Err(AuthError::InvalidResetToken)
        ));
    }

    #[tokio::test]
    async fn completed_reset_lands_home() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/reset-password")
            .with_status(200)
            .create_async()
            .await;

        let reset = reset_for(&server.url(), Arc::new(RecordingRelay::default()));
        assert_eq!(
            reset.complete("tok", "pw", "pw").await.unwrap(),
            Route::Home
        );
    }
}
