//! Profile and password commands.

use super::{ensure_can_enter, App};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use radview_client::{ApiError, ProfileUpdate, Route};

/// Show the profile.
pub async fn show(app: &App, format: &OutputFormat) -> Result<()> {
    if !ensure_can_enter(app, Route::Profile, format)? {
        return Ok(());
    }

    let profile = app.client.profile().await?;
    if let OutputFormat::Json = format {
        output::print_json(&profile);
        return Ok(());
    }

    output::print_heading("Profile");
    output::print_row("Email", &profile.email);
    output::print_row("Address", &profile.address);
    output::print_row("Phone", &profile.phone);
    output::print_row(
        "Alert emails",
        if profile.alert_email_enabled {
            "enabled"
        } else {
            "disabled"
        },
    );
    Ok(())
}

/// Update address, phone, or the alert-email switch. Unset fields keep
/// their current value.
pub async fn update(
    app: &App,
    address: Option<String>,
    phone: Option<String>,
    alert_emails: Option<bool>,
    format: &OutputFormat,
) -> Result<()> {
    if !ensure_can_enter(app, Route::Profile, format)? {
        return Ok(());
    }

    let current = app.client.profile().await?;
    let update = ProfileUpdate {
        address: address.unwrap_or(current.address),
        phone: phone.unwrap_or(current.phone),
        alert_email_enabled: alert_emails.unwrap_or(current.alert_email_enabled),
    };

    app.client.update_profile(&update).await?;
    output::print_success("Profile updated", format);
    Ok(())
}

/// Change the password of the logged-in account.
pub async fn change_password(app: &App, format: &OutputFormat) -> Result<()> {
    if !ensure_can_enter(app, Route::Profile, format)? {
        return Ok(());
    }

    let old_password = rpassword::prompt_password("Old password: ")?;
    let new_password = rpassword::prompt_password("New password: ")?;

    match app.client.change_password(&old_password, &new_password).await {
        Ok(()) => output::print_success("Password changed", format),
        Err(ApiError::Validation(message)) => output::print_error(&message, format),
        Err(err) => output::print_error(&format!("Password change failed: {}", err), format),
    }
    Ok(())
}

/// Request a password reset email.
pub async fn reset(app: &App, email: &str, format: &OutputFormat) -> Result<()> {
    match app.session.request_password_reset(email).await {
        Ok(()) => output::print_success("Password reset e-mail sent", format),
        Err(ApiError::Validation(message)) => output::print_error(&message, format),
        Err(err) => output::print_error(&format!("Password reset failed: {}", err), format),
    }
    Ok(())
}

/// Confirm a password reset with the uid and token from the emailed link.
pub async fn confirm_reset(app: &App, uid: &str, token: &str, format: &OutputFormat) -> Result<()> {
    let new_password1 = rpassword::prompt_password("New password: ")?;
    let new_password2 = rpassword::prompt_password("Confirm password: ")?;
    if new_password1 != new_password2 {
        output::print_error("Passwords do not match", format);
        return Ok(());
    }

    match app
        .session
        .confirm_password_reset(uid, token, &new_password1, &new_password2)
        .await
    {
        Ok(()) => output::print_success("Password has been reset", format),
        Err(ApiError::Validation(message)) => output::print_error(&message, format),
        Err(err) => output::print_error(&format!("Password reset failed: {}", err), format),
    }
    Ok(())
}
