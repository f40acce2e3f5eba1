//! Authentication commands.

use super::App;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use radview_client::{ApiError, Route};
use std::io::{self, Write};

fn prompt_line(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Login with email and password.
pub async fn login(app: &App, format: &OutputFormat) -> Result<()> {
    if !app.gate.can_enter(Route::Login)? {
        output::print_success("Already logged in", format);
        return Ok(());
    }

    let email = prompt_line("Email")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    println!("Logging in...");
    match app.session.login(&email, &password).await {
        Ok(()) => output::print_success(&format!("Logged in as {}", email), format),
        Err(ApiError::InvalidCredentials(_)) => {
            output::print_error("Invalid credentials", format);
        }
        Err(err) => output::print_error(&format!("Login failed: {}", err), format),
    }
    Ok(())
}

/// Logout and clear the stored session.
pub fn logout(app: &App, format: &OutputFormat) -> Result<()> {
    if !app.session.is_authenticated()? {
        output::print_success("Not logged in", format);
        return Ok(());
    }
    app.session.logout()?;
    output::print_success("Logged out", format);
    Ok(())
}

/// Register a new account.
pub async fn register(app: &App, format: &OutputFormat) -> Result<()> {
    if !app.gate.can_enter(Route::Register)? {
        output::print_success("Already logged in", format);
        return Ok(());
    }

    let email = prompt_line("Email")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let password1 = rpassword::prompt_password("Password: ")?;
    let password2 = rpassword::prompt_password("Confirm password: ")?;
    if password1 != password2 {
        output::print_error("Passwords do not match", format);
        return Ok(());
    }

    match app.session.register(&email, &password1, &password2).await {
        Ok(()) => output::print_success(
            "Registration successful. You can now run 'radview login'.",
            format,
        ),
        Err(ApiError::RegistrationRejected(message)) => output::print_error(&message, format),
        Err(err) => output::print_error(&format!("Registration failed: {}", err), format),
    }
    Ok(())
}

/// Check authentication status.
pub async fn status(app: &App, format: &OutputFormat) -> Result<()> {
    if !app.session.is_authenticated()? {
        output::print_success("Not logged in", format);
        return Ok(());
    }

    // A live request both shows who we are and discovers an expired
    // session reactively.
    match app.client.profile().await {
        Ok(profile) => {
            output::print_success(&format!("Logged in as {}", profile.email), format)
        }
        Err(err) if err.is_session_terminal() => {
            output::print_success("Session expired", format)
        }
        Err(err) => output::print_error(&format!("Status check failed: {}", err), format),
    }
    Ok(())
}
