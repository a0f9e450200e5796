use thiserror::Error;

use crate::api::{ApiError, GENERIC_ERROR_MESSAGE};
use crate::session::SessionError;
use crate::token::DecodeError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Could not reach the backend: {0}")]
    NetworkFailure(String),
    #[error("Backend rejected the request: {0}")]
    Rejected(ApiError),
    #[error("Backend issued an unusable credential: {0}")]
    Decode(#[from] DecodeError),
    /// A logout or another login landed while this login was in flight.
    #[error("Login superseded by a newer session change")]
    Superseded,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password reset link is invalid or expired")]
    InvalidResetToken,
    #[error("Failed to send the reset email: {0}")]
    EmailRelay(String),
    #[error("Session storage failure: {0}")]
    Storage(String),
}

impl AuthError {
    pub fn user_message(&self) -> &str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password.",
            AuthError::PasswordMismatch => "Passwords do not match.",
            AuthError::InvalidResetToken => "The reset link is invalid or has expired.",
            AuthError::Rejected(e) => e.user_message(),
            _ => GENERIC_ERROR_MESSAGE,
        }
    }

    /// Login failures: the backend answers 400, 401 or 403 for bad input
    /// or bad credentials.
    pub(crate) fn from_login(error: ApiError) -> Self {
        match error.status() {
            Some(400 | 401 | 403) => AuthError::InvalidCredentials,
            _ => Self::from_api(error),
        }
    }

    pub(crate) fn from_api(error: ApiError) -> Self {
        match error {
            ApiError::Network(e) => AuthError::NetworkFailure(e),
            other => AuthError::Rejected(other),
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Decode(e) => AuthError::Decode(e),
            SessionError::Storage(e) => AuthError::Storage(e),
            SessionError::Stale => AuthError::Superseded,
        }
    }
}
