//! Typed access to the backend's REST surface under `{base_url}/api`.

pub mod auth;
pub mod client;
pub mod error;
pub mod messages;
pub mod projects;
pub mod users;

pub use auth::{LoginResponse, LoginUser, Registration};
pub use client::ApiClient;
pub use error::{ApiError, GENERIC_ERROR_MESSAGE};
pub use projects::DocumentFile;
pub use users::{ProfileUpdate, UserProfile};
