use thiserror::Error;

/// What the user sees whenever a request fails for a reason they cannot fix.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred, try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS...).
    #[error("Network failure: {0}")]
    Network(String),
    /// 401, or 422 for a credential the backend refuses to parse.
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    /// A success response whose body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Status { status, .. } => {
                Some(*status)
            }
            ApiError::NotFound(_) => Some(404),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }

    /// Text fit for an error banner. Backend messages are shown as sent;
    /// transport and decoding problems collapse to the generic message.
    pub fn user_message(&self) -> &str {
        let message = match self {
            ApiError::Network(_) | ApiError::Decode(_) => return GENERIC_ERROR_MESSAGE,
            ApiError::Unauthorized { message, .. } | ApiError::Status { message, .. } => message,
            ApiError::NotFound(message) => message,
        };
        if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE
        } else {
            message
        }
    }

    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 422 => ApiError::Unauthorized { status, message },
            404 => ApiError::NotFound(message),
            _ => ApiError::Status { status, message },
        }
    }
}
