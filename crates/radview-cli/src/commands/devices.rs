//! Device registry and dashboard commands.

use super::{ensure_can_enter, App};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use radview_client::{AlertLevel, AlertThresholds, ApiError, Dashboard, Route};

/// List registered sensors.
pub async fn list(app: &App, format: &OutputFormat) -> Result<()> {
    if !ensure_can_enter(app, Route::Devices, format)? {
        return Ok(());
    }

    let devices = app.client.list_devices().await?;
    if let OutputFormat::Json = format {
        output::print_json(&devices);
        return Ok(());
    }

    if devices.is_empty() {
        println!("No devices found.");
        return Ok(());
    }
    output::print_heading("My Devices");
    for device in &devices {
        println!(
            "  {} ({}) added {}",
            device.display_name(),
            device.serial_number,
            device.date_created.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Register a sensor to this account.
pub async fn add(app: &App, name: &str, serial_number: &str, format: &OutputFormat) -> Result<()> {
    if !ensure_can_enter(app, Route::Devices, format)? {
        return Ok(());
    }

    match app.client.add_device(name, serial_number).await {
        Ok(device) => output::print_success(
            &format!("Device {} added", device.serial_number),
            format,
        ),
        Err(ApiError::Validation(message)) => output::print_error(&message, format),
        Err(err) => output::print_error(&format!("Failed to add device: {}", err), format),
    }
    Ok(())
}

/// Show one sensor.
pub async fn show(app: &App, id: i64, format: &OutputFormat) -> Result<()> {
    if !ensure_can_enter(app, Route::Devices, format)? {
        return Ok(());
    }

    let device = app.client.device(id).await?;
    if let OutputFormat::Json = format {
        output::print_json(&device);
        return Ok(());
    }

    output::print_heading(device.display_name());
    output::print_row("Serial", &device.serial_number);
    output::print_row("Added", &device.date_created.to_rfc3339());
    output::print_row("Updated", &device.date_updated.to_rfc3339());
    Ok(())
}

/// Show the dashboard for a sensor.
pub async fn dashboard(app: &App, serial_number: &str, format: &OutputFormat) -> Result<()> {
    if !ensure_can_enter(app, Route::Dashboard, format)? {
        return Ok(());
    }

    let dashboard = app.client.device_dashboard(serial_number).await?;
    let thresholds = AlertThresholds {
        warning: app.config.warning_threshold,
        alert: app.config.alert_threshold,
    };
    render_dashboard(serial_number, &dashboard, thresholds);
    Ok(())
}

fn render_dashboard(serial_number: &str, dashboard: &Dashboard, thresholds: AlertThresholds) {
    output::print_heading(&format!("Dashboard for {}", serial_number));

    match dashboard.recent_reading.value {
        Some(value) => {
            match thresholds.classify(value) {
                AlertLevel::Alert => println!(
                    "  ALERT: recent value {} Bq/m3 exceeds the alert threshold ({})",
                    value, thresholds.alert
                ),
                AlertLevel::Warning => println!(
                    "  WARNING: recent value {} Bq/m3 exceeds the warning threshold ({})",
                    value, thresholds.warning
                ),
                AlertLevel::Ok => {}
            }
            output::print_row("Value", &format!("{} Bq/m3", value));
            if let Some(rssi) = dashboard.recent_reading.rssi {
                output::print_row("RSSI", &rssi.to_string());
            }
            if let Some(timestamp) = dashboard.recent_reading.timestamp {
                output::print_row("Time", &timestamp.format("%Y-%m-%d %H:%M").to_string());
            }
        }
        None => println!("  No readings yet."),
    }

    println!();
    output::print_heading("Averages");
    output::print_row("24 hours", &format_average(dashboard.averages.hours_24));
    output::print_row("7 days", &format_average(dashboard.averages.days_7));
    output::print_row("30 days", &format_average(dashboard.averages.days_30));

    println!();
    println!("  {} trend points over the last 30 days", dashboard.trend.len());
}

fn format_average(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.2} Bq/m3", value),
        None => "N/A".to_string(),
    }
}
