use std::sync::Arc;

use tracing::{info, warn};

use super::error::AuthError;
use crate::api::{ApiClient, ApiError, Registration};
use crate::guard::{landing_route, Route};
use crate::models::Role;
use crate::session::SessionStore;
use crate::token::Credential;

/// Login, registration and logout on top of the API client and the
/// session store.
pub struct AuthService {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Exchange email and password for a credential and install it.
    /// Returns the landing route of the new identity.
    ///
    /// If the session is cleared or replaced while the request is in
    /// flight, the response is discarded with [`AuthError::Superseded`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Route, AuthError> {
        let ticket = self.session.begin_login();

        let response = self
            .api
            .login(email, password)
            .await
            .map_err(AuthError::from_login)?;

        let identity = self
            .session
            .complete_login(ticket, response.access_token)?;
        self.api.clear_cache();

        let landing = landing_route(Some(&identity));
        info!(
            event_name = "auth.login.succeeded",
            event_domain = "auth",
            role = identity.role.as_str(),
            landing = %landing,
            "Logged in"
        );
        Ok(landing)
    }

    /// Self-service sign up. Only clients may register; providers are
    /// provisioned on the backend.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), AuthError> {
        if password != confirmation {
            return Err(AuthError::PasswordMismatch);
        }

        let registration = Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::Client,
        };
        self.api
            .register(&registration)
            .await
            .map_err(AuthError::from_api)?;

        info!(
            event_name = "auth.register.succeeded",
            event_domain = "auth",
            "Registered new client account"
        );
        Ok(())
    }

    /// Clear the local session first, then ask the backend to revoke the
    /// credential. Revocation failures are logged and otherwise ignored.
    ///
    /// The backend is asked to revoke even when the local session could not
    /// be wiped from storage; that failure is reported afterwards as
    /// [`AuthError::Storage`].
    pub async fn logout(&self) -> Result<Route, AuthError> {
        let credential = self.session.credential();
        let cleared = self.session.clear();
        self.api.clear_cache();

        if let Some(credential) = credential {
            if let Err(e) = self.api.logout(&credential).await {
                warn!(
                    event_name = "auth.logout.revoke_failed",
                    event_domain = "auth",
                    "Server-side logout failed: {}",
                    e
                );
            }
        }
        cleared?;
        Ok(landing_route(None))
    }

    /// Drop the session when the backend refused `sent_with`, the credential
    /// the failed request carried. A refusal that arrives after the session
    /// moved on to another credential leaves the newer session alone.
    ///
    /// Returns `true` when the session was cleared.
    pub fn expire_on_unauthorized(
        &self,
        sent_with: &Credential,
        error: &ApiError,
    ) -> Result<bool, AuthError> {
        if !matches!(error, ApiError::Unauthorized { .. }) {
            return Ok(false);
        }
        if !self.session.clear_if_current(sent_with)? {
            return Ok(false);
        }
        warn!(
            event_name = "auth.session.expired",
            event_domain = "auth",
            "Backend refused the stored credential; clearing session"
        );
        self.api.clear_cache();
        Ok(true)
    }
}
