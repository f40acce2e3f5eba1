//! Account and session lifecycle: login, registration, logout, password
//! reset.

use crate::error::{first_field_error, ApiError, ApiResult};
use crate::transport::{ApiClient, ApiRequest, SessionEndedCallback};
use radview_storage::{CredentialPair, CredentialStore};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Login response: the full credential pair.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
}

/// Manages the account session on top of the authorized transport.
pub struct SessionManager {
    store: Arc<CredentialStore>,
    client: Arc<ApiClient>,
}

impl SessionManager {
    /// Create a session manager sharing the client's credential store.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            store: client.credential_store(),
            client,
        }
    }

    /// Login with email and password and store the issued credential pair.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        let request = ApiRequest::post(
            "auth/login/",
            serde_json::json!({
                "email": email,
                "password": password,
            }),
        )
        .anonymous();

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized { status, body })
            | Err(ApiError::RequestFailed { status, body }) => {
                warn!(status, "Login failed");
                return Err(ApiError::InvalidCredentials(format!(
                    "HTTP {}: {}",
                    status, body
                )));
            }
            Err(err) => return Err(err),
        };

        let data: LoginResponse = response.json().await?;
        self.store.set(&CredentialPair {
            access_token: data.access,
            refresh_token: data.refresh,
        })?;

        info!("Login successful");
        Ok(())
    }

    /// Register a new account.
    pub async fn register(
        &self,
        email: &str,
        password1: &str,
        password2: &str,
    ) -> ApiResult<()> {
        let request = ApiRequest::post(
            "auth/registration/",
            serde_json::json!({
                "email": email,
                "password1": password1,
                "password2": password2,
            }),
        )
        .anonymous();

        match self.client.send(request).await {
            Ok(()) => {
                info!("Registration successful");
                Ok(())
            }
            Err(ApiError::Unauthorized { status, body })
            | Err(ApiError::RequestFailed { status, body }) => {
                warn!(status, "Registration rejected");
                let message = first_field_error(&body)
                    .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
                Err(ApiError::RegistrationRejected(message))
            }
            Err(err) => Err(err),
        }
    }

    /// Logout by clearing the stored credentials.
    pub fn logout(&self) -> ApiResult<()> {
        self.store.clear()?;
        self.client.notify_session_ended("logged out");
        info!("Logged out");
        Ok(())
    }

    /// Check whether an access token is stored. A presence check only;
    /// an expired token is discovered when the platform rejects it.
    pub fn is_authenticated(&self) -> ApiResult<bool> {
        Ok(self.store.is_authenticated()?)
    }

    /// Request a password reset email.
    pub async fn request_password_reset(&self, email: &str) -> ApiResult<()> {
        let request = ApiRequest::post(
            "password-reset/",
            serde_json::json!({ "email": email }),
        )
        .anonymous();

        match self.client.send(request).await {
            Ok(()) => Ok(()),
            Err(ApiError::RequestFailed { status, body }) => {
                let message = first_field_error(&body)
                    .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
                Err(ApiError::Validation(message))
            }
            Err(err) => Err(err),
        }
    }

    /// Confirm a password reset with the uid and token from the emailed
    /// link.
    pub async fn confirm_password_reset(
        &self,
        uidb64: &str,
        token: &str,
        new_password1: &str,
        new_password2: &str,
    ) -> ApiResult<()> {
        let request = ApiRequest::post(
            &format!("password-reset-confirm/{}/{}/", uidb64, token),
            serde_json::json!({
                "new_password1": new_password1,
                "new_password2": new_password2,
            }),
        )
        .anonymous();

        match self.client.send(request).await {
            Ok(()) => {
                info!("Password reset confirmed");
                Ok(())
            }
            Err(ApiError::RequestFailed { status, body }) => {
                let message = first_field_error(&body)
                    .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
                Err(ApiError::Validation(message))
            }
            Err(err) => Err(err),
        }
    }

    /// Register the callback invoked when the session ends.
    pub fn set_session_ended_callback(&self, callback: SessionEndedCallback) {
        self.client.set_session_ended_callback(callback);
    }
}
