//! User profile and password-change endpoints.

use crate::error::{first_field_error, ApiError, ApiResult};
use crate::transport::{ApiClient, ApiRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

/// The account profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account email (read-only on the platform)
    pub email: String,
    /// Postal address
    #[serde(default)]
    pub address: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Whether threshold alert emails are sent
    pub alert_email_enabled: bool,
}

/// Writable profile fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    /// Postal address
    pub address: String,
    /// Phone number
    pub phone: String,
    /// Whether threshold alert emails are sent
    pub alert_email_enabled: bool,
}

impl ApiClient {
    /// Fetch the account profile.
    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.json(ApiRequest::get("profile/")).await
    }

    /// Replace the writable profile fields.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        let body = serde_json::to_value(update)?;
        let profile = self.json(ApiRequest::put("profile/", body)).await?;
        info!("Profile updated");
        Ok(profile)
    }

    /// Change the password of the logged-in account.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let request = ApiRequest::post(
            "password-change/",
            serde_json::json!({
                "old_password": old_password,
                "new_password": new_password,
            }),
        );

        match self.send(request).await {
            Ok(()) => {
                info!("Password changed");
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
}
