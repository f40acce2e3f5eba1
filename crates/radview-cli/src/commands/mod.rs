//! Command implementations.

pub mod auth;
pub mod devices;
pub mod profile;

use crate::output::{self, OutputFormat};
use anyhow::Result;
use radview_client::{ApiClient, Route, SessionGate, SessionManager};
use radview_config::{Config, Paths};
use radview_storage::create_credential_store;
use std::sync::Arc;

/// Everything a command needs to talk to the platform.
pub struct App {
    pub config: Config,
    pub client: Arc<ApiClient>,
    pub session: SessionManager,
    pub gate: SessionGate,
}

/// Build the client stack from the on-disk config and credentials.
pub fn build_app() -> Result<App> {
    let paths = Paths::new()?;
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;

    let store = Arc::new(create_credential_store(paths.credentials_file()));
    let client = Arc::new(ApiClient::new(&config.api_base_url, store.clone()));
    client.set_session_ended_callback(Box::new(|reason| {
        eprintln!(
            "Session ended ({}). Run 'radview login' to sign in again.",
            reason
        );
    }));

    Ok(App {
        config,
        session: SessionManager::new(client.clone()),
        gate: SessionGate::new(store),
        client,
    })
}

/// Guard for protected commands; prints a login hint when the gate
/// rejects the route.
pub fn ensure_can_enter(app: &App, route: Route, format: &OutputFormat) -> Result<bool> {
    if app.gate.can_enter(route)? {
        return Ok(true);
    }
    output::print_error("Not logged in. Run 'radview login' first.", format);
    Ok(false)
}
