//! API error types.

use thiserror::Error;

/// Error type for platform API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid email or password
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Registration rejected by the platform
    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),

    /// Request body rejected by the platform (field validation)
    #[error("Request rejected: {0}")]
    Validation(String),

    /// No session exists
    #[error("Not logged in")]
    NotLoggedIn,

    /// Session could not be recovered; the user was logged out
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// The access token was rejected and the request was not recoverable
    #[error("Authorization rejected: HTTP {status}: {body}")]
    Unauthorized {
        /// HTTP status code (401)
        status: u16,
        /// Response body text
        body: String,
    },

    /// Any other non-success response
    #[error("Request failed: HTTP {status}: {body}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] radview_storage::StorageError),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Returns true if this error ended the session (the credentials were
    /// cleared and the user must log in again).
    pub fn is_session_terminal(&self) -> bool {
        matches!(self, ApiError::SessionExpired(_) | ApiError::NotLoggedIn)
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

/// Pick the first human-readable message out of a field-error body.
///
/// The platform reports validation failures as a JSON object whose values
/// are either arrays of strings or plain strings, e.g.
/// `{"serial_number": ["This field is required."]}` or
/// `{"detail": "Device already added."}`.
pub(crate) fn first_field_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    for entry in object.values() {
        match entry {
            serde_json::Value::Array(items) => {
                if let Some(first) = items.iter().find_map(|item| item.as_str()) {
                    return Some(first.to_string());
                }
            }
            serde_json::Value::String(message) => return Some(message.clone()),
            _ => {}
        }
    }
    None
}
