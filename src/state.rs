//! Shared application state.
//!
//! One instance is built at startup and handed to every view or command,
//! so nothing in the crate reaches for a global session.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::{AuthService, PasswordReset};
use crate::config::ConfigV1;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    pub api: Arc<ApiClient>,
    /// The single source of truth for who is logged in.
    pub session: Arc<SessionStore>,
    pub auth: Arc<AuthService>,
    pub password_reset: Arc<PasswordReset>,
}
