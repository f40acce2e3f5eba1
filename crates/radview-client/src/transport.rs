//! Authorized HTTP transport for the platform API.
//!
//! Every outbound request is described by an [`ApiRequest`], which holds
//! enough state to be rebuilt and resubmitted. Bearer requests get the
//! current access token attached; a 401 on a not-yet-retried bearer
//! request triggers the refresh path and a single replay. The refresh
//! call itself goes out on the anonymous path so it can never recurse.

use crate::error::{ApiError, ApiResult};
use crate::refresh::{RefreshCoordinator, RefreshTicket};
use radview_storage::CredentialStore;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Callback invoked when the session ends: explicit logout, refresh
/// failure, or an authorization failure with no refresh token stored.
/// The navigation layer uses it to return to the login entry point.
pub type SessionEndedCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    /// Attach the current access token, if any.
    Bearer,
    /// Never attach credentials (login, registration, password reset,
    /// and the refresh call itself).
    Anonymous,
}

/// A replayable description of an outbound request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    auth: AuthMode,
    /// Set after the one post-refresh replay; a second 401 propagates.
    retried: bool,
}

impl ApiRequest {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            body: None,
            auth: AuthMode::Bearer,
            retried: false,
        }
    }

    /// A GET request on the authorized path.
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// A POST request with a JSON body on the authorized path.
    pub fn post(path: &str, body: serde_json::Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }

    /// A PUT request with a JSON body on the authorized path.
    pub fn put(path: &str, body: serde_json::Value) -> Self {
        let mut request = Self::new(Method::PUT, path);
        request.body = Some(body);
        request
    }

    /// Send without credentials and outside the refresh path.
    pub fn anonymous(mut self) -> Self {
        self.auth = AuthMode::Anonymous;
        self
    }

    fn into_retry(mut self) -> Self {
        self.retried = true;
        self
    }
}

/// HTTP client for the platform API.
///
/// Holds the shared transport, the credential store, and the refresh
/// coordinator. Callers issue requests and receive resolved or rejected
/// outcomes; a successful refresh is invisible to them.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<CredentialStore>,
    refresh: RefreshCoordinator,
    session_ended: Mutex<Option<SessionEndedCallback>>,
}

/// Refresh response: the platform rotates only the access token.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

impl ApiClient {
    /// Create a new client against the given API base URL.
    pub fn new(base_url: &str, store: Arc<CredentialStore>) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Self {
            http: reqwest::Client::new(),
            base_url,
            store,
            refresh: RefreshCoordinator::new(),
            session_ended: Mutex::new(None),
        }
    }

    /// The credential store this client reads tokens from.
    pub fn credential_store(&self) -> Arc<CredentialStore> {
        self.store.clone()
    }

    /// Register the callback invoked whenever the session ends.
    pub fn set_session_ended_callback(&self, callback: SessionEndedCallback) {
        let mut cb = self.session_ended.lock().unwrap();
        *cb = Some(callback);
    }

    /// Build the full URL for an API path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build and send one request, attaching the bearer token when the
    /// request wants one and a token is stored. Absence of a token sends
    /// the request unauthorized; the platform's rejection is handled by
    /// the caller of this method.
    async fn dispatch(&self, request: &ApiRequest) -> ApiResult<Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.endpoint(&request.path));

        if request.auth == AuthMode::Bearer {
            if let Some(token) = self.store.access_token()? {
                builder = builder.header("Authorization", format!("Bearer {}", token));
            }
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    /// Execute a request, transparently refreshing the access token once
    /// on an authorization failure.
    pub async fn execute(&self, mut request: ApiRequest) -> ApiResult<Response> {
        loop {
            let response = self.dispatch(&request).await?;

            // Anonymous requests never enter the refresh path, and a
            // request that already replayed once propagates its second
            // authorization failure as-is.
            if request.auth == AuthMode::Anonymous
                || response.status() != StatusCode::UNAUTHORIZED
                || request.retried
            {
                return Self::into_result(response).await;
            }

            if self.store.refresh_token()?.is_none() {
                self.terminate_session("authorization failed with no refresh token stored");
                return Err(ApiError::SessionExpired(
                    "access token rejected and no refresh token is stored".to_string(),
                ));
            }

            self.refreshed_access_token().await?;

            request = request.into_retry();
            debug!(path = %request.path, "Replaying request with refreshed token");
        }
    }

    /// Execute a request and deserialize its JSON body.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Execute a request and discard its body.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<()> {
        self.execute(request).await?;
        Ok(())
    }

    /// Obtain a refreshed access token, either by performing the refresh
    /// call (leader) or by awaiting the one already in flight (waiter).
    /// Exactly one refresh call goes out per episode.
    async fn refreshed_access_token(&self) -> ApiResult<String> {
        match self.refresh.begin() {
            RefreshTicket::Leader => {
                debug!("Starting token refresh");
                match self.run_refresh().await {
                    Ok(access_token) => {
                        self.refresh.settle_ok(&access_token);
                        Ok(access_token)
                    }
                    Err(err) => {
                        let reason = err.to_string();
                        self.refresh.settle_err(&reason);
                        self.terminate_session(&reason);
                        Err(ApiError::SessionExpired(reason))
                    }
                }
            }
            RefreshTicket::Waiter(rx) => match rx.await {
                Ok(Ok(access_token)) => Ok(access_token),
                Ok(Err(reason)) => Err(ApiError::SessionExpired(reason)),
                Err(_) => Err(ApiError::SessionExpired(
                    "refresh abandoned before settling".to_string(),
                )),
            },
        }
    }

    /// The single refresh call of an episode. Anonymous path: the refresh
    /// endpoint must never itself be intercepted as requiring a bearer
    /// token.
    async fn run_refresh(&self) -> ApiResult<String> {
        let refresh_token = self.store.refresh_token()?.ok_or(ApiError::NotLoggedIn)?;

        let request = ApiRequest::post(
            "jwt/refresh/",
            serde_json::json!({ "refresh": refresh_token }),
        )
        .anonymous();

        let response = self.dispatch(&request).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Token refresh rejected");
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let data: RefreshResponse = response.json().await?;
        self.store.set_access_token(&data.access)?;
        info!("Access token refreshed");
        Ok(data.access)
    }

    /// Clear the credentials and notify the navigation layer. Used for
    /// unrecoverable authorization failures; explicit logout goes through
    /// `SessionManager::logout`.
    pub(crate) fn terminate_session(&self, reason: &str) {
        warn!(reason = %reason, "Session terminated, clearing credentials");
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to clear credentials");
        }
        self.notify_session_ended(reason);
    }

    pub(crate) fn notify_session_ended(&self, reason: &str) {
        let cb = self.session_ended.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback(reason);
        }
    }

    /// Map a settled response to a result: success passes through, 401
    /// becomes an authorization failure, everything else an unrelated
    /// failure.
    async fn into_result(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
                body,
            });
        }
        Err(ApiError::RequestFailed {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_store;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/api", memory_store());
        assert_eq!(client.endpoint("devices/"), "http://localhost:8000/api/devices/");
    }

    #[test]
    fn test_endpoint_strips_leading_slash() {
        let client = ApiClient::new("http://localhost:8000/api/", memory_store());
        assert_eq!(client.endpoint("/devices/"), "http://localhost:8000/api/devices/");
    }

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::get("devices/");
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.auth, AuthMode::Bearer);
        assert!(!request.retried);

        let request = ApiRequest::post("auth/login/", serde_json::json!({})).anonymous();
        assert_eq!(request.auth, AuthMode::Anonymous);

        let request = ApiRequest::put("profile/", serde_json::json!({}));
        assert_eq!(request.method, Method::PUT);
    }

    #[test]
    fn test_into_retry_marks_request() {
        let request = ApiRequest::get("devices/").into_retry();
        assert!(request.retried);
    }
}
