//! Route admission for the navigation layer.

use radview_storage::{CredentialStore, StorageResult};
use std::sync::Arc;

/// The navigable surface of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Landing page, open to everyone.
    Home,
    /// Login form.
    Login,
    /// Account registration form.
    Register,
    /// Password reset request and confirmation.
    PasswordReset,
    /// Per-device dashboards.
    Dashboard,
    /// Device registry.
    Devices,
    /// Profile and password management.
    Profile,
}

impl Route {
    /// Routes that require an authenticated session.
    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Dashboard | Route::Devices | Route::Profile)
    }

    /// Routes only shown to unauthenticated visitors.
    pub fn guest_only(self) -> bool {
        matches!(self, Route::Login | Route::Register | Route::PasswordReset)
    }
}

/// Admits or redirects navigation based on the live authentication state.
///
/// Purely derived from the credential store's presence check; no side
/// effects, no caching.
pub struct SessionGate {
    store: Arc<CredentialStore>,
}

impl SessionGate {
    /// Create a gate over the given credential store.
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    /// Whether the route may be entered right now.
    pub fn can_enter(&self, route: Route) -> StorageResult<bool> {
        let authenticated = self.store.is_authenticated()?;
        if route.requires_auth() {
            return Ok(authenticated);
        }
        if route.guest_only() {
            return Ok(!authenticated);
        }
        Ok(true)
    }

    /// Where to send a visitor that may not enter the route: protected
    /// routes redirect to login, guest-only routes to the dashboard.
    pub fn redirect(&self, route: Route) -> StorageResult<Option<Route>> {
        if self.can_enter(route)? {
            return Ok(None);
        }
        if route.requires_auth() {
            Ok(Some(Route::Login))
        } else {
            Ok(Some(Route::Dashboard))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_store;
    use radview_storage::CredentialPair;

    fn authenticated_store() -> Arc<CredentialStore> {
        let store = memory_store();
        store
            .set(&CredentialPair {
                access_token: "A1".to_string(),
                refresh_token: "R1".to_string(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_unauthenticated_admission() {
        let gate = SessionGate::new(memory_store());

        assert!(gate.can_enter(Route::Home).unwrap());
        assert!(gate.can_enter(Route::Login).unwrap());
        assert!(gate.can_enter(Route::Register).unwrap());
        assert!(gate.can_enter(Route::PasswordReset).unwrap());
        assert!(!gate.can_enter(Route::Dashboard).unwrap());
        assert!(!gate.can_enter(Route::Devices).unwrap());
        assert!(!gate.can_enter(Route::Profile).unwrap());
    }

    #[test]
    fn test_authenticated_admission() {
        let gate = SessionGate::new(authenticated_store());

        assert!(gate.can_enter(Route::Home).unwrap());
        assert!(!gate.can_enter(Route::Login).unwrap());
        assert!(!gate.can_enter(Route::Register).unwrap());
        assert!(!gate.can_enter(Route::PasswordReset).unwrap());
        assert!(gate.can_enter(Route::Dashboard).unwrap());
        assert!(gate.can_enter(Route::Devices).unwrap());
        assert!(gate.can_enter(Route::Profile).unwrap());
    }

    #[test]
    fn test_redirects_unauthenticated_to_login() {
        let gate = SessionGate::new(memory_store());

        assert_eq!(gate.redirect(Route::Dashboard).unwrap(), Some(Route::Login));
        assert_eq!(gate.redirect(Route::Login).unwrap(), None);
    }

    #[test]
    fn test_redirects_authenticated_to_dashboard() {
        let gate = SessionGate::new(authenticated_store());

        assert_eq!(gate.redirect(Route::Login).unwrap(), Some(Route::Dashboard));
        assert_eq!(gate.redirect(Route::Dashboard).unwrap(), None);
    }

    #[test]
    fn test_gate_follows_live_state() {
        let store = memory_store();
        let gate = SessionGate::new(store.clone());

        assert!(!gate.can_enter(Route::Devices).unwrap());

        store
            .set(&CredentialPair {
                access_token: "A1".to_string(),
                refresh_token: "R1".to_string(),
            })
            .unwrap();
        assert!(gate.can_enter(Route::Devices).unwrap());

        store.clear().unwrap();
        assert!(!gate.can_enter(Route::Devices).unwrap());
    }
}
