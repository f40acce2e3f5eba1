//! HTTP client for the radon monitoring platform.
//!
//! This crate provides:
//! - `ApiClient`: authorized transport with transparent single-flight
//!   token refresh and one replay per failed request
//! - `SessionManager`: login, registration, logout, password reset
//! - `SessionGate`: route admission for the navigation layer
//! - Typed device, dashboard, and profile endpoints

mod devices;
mod error;
mod gate;
mod profile;
mod refresh;
mod session;
mod transport;

pub use devices::{
    AlertLevel, AlertThresholds, Averages, Dashboard, Device, RecentReading, TrendPoint,
};
pub use error::{ApiError, ApiResult};
pub use gate::{Route, SessionGate};
pub use profile::{ProfileUpdate, UserProfile};
pub use session::SessionManager;
pub use transport::{ApiClient, ApiRequest, SessionEndedCallback};
