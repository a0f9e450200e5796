pub mod email_relay;
pub mod error;
pub mod password_reset;
pub mod service;

// Re-export the primary items so callers can do "use crate::auth::*;"
pub use email_relay::{create_email_relay, DisabledRelay, EmailJsRelay, EmailRelay};
pub use error::AuthError;
pub use password_reset::PasswordReset;
pub use service::AuthService;
