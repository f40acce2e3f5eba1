//! Device registry and dashboard endpoints.

use crate::error::{first_field_error, ApiError, ApiResult};
use crate::transport::{ApiClient, ApiRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// A radon sensor registered to the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Database id
    pub id: i64,
    /// Alphanumeric EUI-64 serial number
    pub serial_number: String,
    /// Display name; the platform may omit it
    #[serde(default)]
    pub name: Option<String>,
    /// When the device was first registered
    pub date_created: DateTime<Utc>,
    /// Last update to the registration
    pub date_updated: DateTime<Utc>,
    /// Ids of the users the device is registered to
    #[serde(default)]
    pub users: Vec<i64>,
}

impl Device {
    /// Name to show in listings, falling back to the serial number.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.serial_number)
    }
}

/// The most recent reading of a device, if it has reported at all.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentReading {
    /// Radon concentration in Bq/m3
    #[serde(default, deserialize_with = "de_opt_float")]
    pub value: Option<f64>,
    /// Signal strength of the uplink
    #[serde(default, deserialize_with = "de_opt_float")]
    pub rssi: Option<f64>,
    /// When the reading was taken
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Rolling averages over the trailing windows.
///
/// The platform renders decimal averages as JSON strings; numbers are
/// accepted too.
#[derive(Debug, Clone, Deserialize)]
pub struct Averages {
    /// Trailing 24 hours
    #[serde(rename = "24_hours", default, deserialize_with = "de_opt_float")]
    pub hours_24: Option<f64>,
    /// Trailing 7 days
    #[serde(rename = "7_days", default, deserialize_with = "de_opt_float")]
    pub days_7: Option<f64>,
    /// Trailing 30 days
    #[serde(rename = "30_days", default, deserialize_with = "de_opt_float")]
    pub days_30: Option<f64>,
}

/// One point of the 30-day trend, ascending by timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendPoint {
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Radon concentration in Bq/m3
    pub value: f64,
    /// Signal strength of the uplink
    pub rssi: f64,
}

/// Dashboard payload for one device.
#[derive(Debug, Clone, Deserialize)]
pub struct Dashboard {
    /// Latest reading
    pub recent_reading: RecentReading,
    /// Rolling averages
    pub averages: Averages,
    /// 30-day history
    pub trend: Vec<TrendPoint>,
}

/// Severity of a radon reading against the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// At or below the warning threshold
    Ok,
    /// Above the warning threshold, at or below the alert threshold
    Warning,
    /// Above the alert threshold
    Alert,
}

/// Radon thresholds in Bq/m3.
#[derive(Debug, Clone, Copy)]
pub struct AlertThresholds {
    /// Warning banner above this value
    pub warning: f64,
    /// Alert banner above this value
    pub alert: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning: 150.0,
            alert: 200.0,
        }
    }
}

impl AlertThresholds {
    /// Classify a reading. Both comparisons are strict: a value exactly
    /// at a threshold stays in the lower band.
    pub fn classify(&self, value: f64) -> AlertLevel {
        if value > self.alert {
            AlertLevel::Alert
        } else if value > self.warning {
            AlertLevel::Warning
        } else {
            AlertLevel::Ok
        }
    }
}

/// Accept a float, a stringified float, or null.
fn de_opt_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => Ok(number.as_f64()),
        Some(serde_json::Value::String(text)) => text
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected number or string, got {}",
            other
        ))),
    }
}

impl ApiClient {
    /// List the devices registered to this account.
    pub async fn list_devices(&self) -> ApiResult<Vec<Device>> {
        self.json(ApiRequest::get("devices/")).await
    }

    /// Register a device to this account by serial number. Registering a
    /// serial another user already owns attaches this account to the same
    /// device; registering one this account already has is rejected by
    /// the platform.
    pub async fn add_device(&self, name: &str, serial_number: &str) -> ApiResult<Device> {
        debug!(serial_number = %serial_number, "Registering device");
        let request = ApiRequest::post(
            "devices/",
            serde_json::json!({
                "name": name,
                "serial_number": serial_number,
            }),
        );

        match self.json(request).await {
            Ok(device) => Ok(device),
            Err(ApiError::RequestFailed { status, body }) => {
                let message = first_field_error(&body)
                    .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
                Err(ApiError::Validation(message))
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch one device by id.
    pub async fn device(&self, id: i64) -> ApiResult<Device> {
        self.json(ApiRequest::get(&format!("devices/{}/", id))).await
    }

    /// Fetch the dashboard for a device by serial number.
    pub async fn device_dashboard(&self, serial_number: &str) -> ApiResult<Dashboard> {
        self.json(ApiRequest::get(&format!(
            "devices/{}/dashboard/",
            serial_number
        )))
        .await
    }
}
