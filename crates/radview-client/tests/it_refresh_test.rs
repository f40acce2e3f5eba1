//! Integration tests for the token refresh path: single-flight refresh,
//! replay, retry guard, and forced logout.

use mockito::{Matcher, Server};
use radview_client::{ApiClient, ApiError};
use radview_storage::{create_credential_store, CredentialPair, CredentialStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn seeded_store(dir: &TempDir) -> Arc<CredentialStore> {
    let store = Arc::new(create_credential_store(dir.path().join("credentials.json")));
    store
        .set(&CredentialPair {
            access_token: "A1".to_string(),
            refresh_token: "R1".to_string(),
        })
        .unwrap();
    store
}

#[tokio::test]
async fn refresh_and_replay_on_401() {
    //* Given
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    let stale_mock = server
        .mock("GET", "/devices/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Given token not valid for any token type"}"#)
        .expect(1)
        .create_async()
        .await;

    let refresh_mock = server
        .mock("POST", "/jwt/refresh/")
        .match_body(Matcher::Json(serde_json::json!({ "refresh": "R1" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A2"}"#)
        .expect(1)
        .create_async()
        .await;

    let fresh_mock = server
        .mock("GET", "/devices/")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = ApiClient::new(&server.url(), store.clone());
    let devices = client.list_devices().await.expect("request failed");

    //* Then
    stale_mock.assert_async().await;
    refresh_mock.assert_async().await;
    fresh_mock.assert_async().await;
    assert!(devices.is_empty());

    // The refresh token is retained unchanged; only the access half rotates.
    let pair = store.get().unwrap().unwrap();
    assert_eq!(pair.access_token, "A2");
    assert_eq!(pair.refresh_token, "R1");
}

#[tokio::test]
async fn concurrent_failures_share_one_refresh() {
    //* Given
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    let stale_devices = server
        .mock("GET", "/devices/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let stale_profile = server
        .mock("GET", "/profile/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let refresh_mock = server
        .mock("POST", "/jwt/refresh/")
        .match_body(Matcher::Json(serde_json::json!({ "refresh": "R1" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A2"}"#)
        .expect(1)
        .create_async()
        .await;

    let fresh_devices = server
        .mock("GET", "/devices/")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;
    let fresh_profile = server
        .mock("GET", "/profile/")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"email": "a@b.com", "address": "", "phone": "", "alert_email_enabled": true}"#)
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = ApiClient::new(&server.url(), store.clone());
    let (devices, profile) = tokio::join!(client.list_devices(), client.profile());

    //* Then
    stale_devices.assert_async().await;
    stale_profile.assert_async().await;
    refresh_mock.assert_async().await;
    fresh_devices.assert_async().await;
    fresh_profile.assert_async().await;
    assert!(devices.expect("devices failed").is_empty());
    assert_eq!(profile.expect("profile failed").email, "a@b.com");
    assert_eq!(store.get().unwrap().unwrap().access_token, "A2");
}

#[tokio::test]
async fn second_401_after_replay_propagates_without_second_refresh() {
    //* Given
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    // The platform rejects every access token: initial attempt and the
    // one post-refresh replay both 401.
    let devices_mock = server
        .mock("GET", "/devices/")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Given token not valid for any token type"}"#)
        .expect(2)
        .create_async()
        .await;

    let refresh_mock = server
        .mock("POST", "/jwt/refresh/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A2"}"#)
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = ApiClient::new(&server.url(), store.clone());
    let result = client.list_devices().await;

    //* Then
    devices_mock.assert_async().await;
    refresh_mock.assert_async().await;
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    // The session itself survives; only this request failed.
    assert!(store.is_authenticated().unwrap());
}

#[tokio::test]
async fn refresh_failure_logs_out_and_rejects_all_callers() {
    //* Given
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    let _stale_devices = server
        .mock("GET", "/devices/")
        .with_status(401)
        .create_async()
        .await;
    let _stale_profile = server
        .mock("GET", "/profile/")
        .with_status(401)
        .create_async()
        .await;

    let refresh_mock = server
        .mock("POST", "/jwt/refresh/")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Token is invalid or expired"}"#)
        .expect(1)
        .create_async()
        .await;

    let ended = Arc::new(AtomicUsize::new(0));
    let ended_clone = ended.clone();

    //* When
    let client = ApiClient::new(&server.url(), store.clone());
    client.set_session_ended_callback(Box::new(move |_reason| {
        ended_clone.fetch_add(1, Ordering::SeqCst);
    }));
    let (devices, profile) = tokio::join!(client.list_devices(), client.profile());

    //* Then
    refresh_mock.assert_async().await;
    assert!(matches!(devices, Err(ApiError::SessionExpired(_))));
    assert!(matches!(profile, Err(ApiError::SessionExpired(_))));
    assert!(!store.is_authenticated().unwrap());
    assert!(ended.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn missing_refresh_token_short_circuits_to_logout() {
    //* Given
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    // No credentials stored at all.
    let store = Arc::new(create_credential_store(dir.path().join("credentials.json")));

    let devices_mock = server
        .mock("GET", "/devices/")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let refresh_mock = server
        .mock("POST", "/jwt/refresh/")
        .expect(0)
        .create_async()
        .await;

    let ended = Arc::new(AtomicUsize::new(0));
    let ended_clone = ended.clone();

    //* When
    let client = ApiClient::new(&server.url(), store.clone());
    client.set_session_ended_callback(Box::new(move |_reason| {
        ended_clone.fetch_add(1, Ordering::SeqCst);
    }));
    let result = client.list_devices().await;

    //* Then
    devices_mock.assert_async().await;
    refresh_mock.assert_async().await;
    assert!(matches!(result, Err(ApiError::SessionExpired(_))));
    assert_eq!(ended.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_authorization_failures_pass_through_untouched() {
    //* Given
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    let devices_mock = server
        .mock("GET", "/devices/")
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(1)
        .create_async()
        .await;

    let refresh_mock = server
        .mock("POST", "/jwt/refresh/")
        .expect(0)
        .create_async()
        .await;

    //* When
    let client = ApiClient::new(&server.url(), store.clone());
    let result = client.list_devices().await;

    //* Then
    devices_mock.assert_async().await;
    refresh_mock.assert_async().await;
    match result {
        Err(ApiError::RequestFailed { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected RequestFailed, got {:?}", other.err()),
    }
    // The session is untouched by unrelated failures.
    assert!(store.is_authenticated().unwrap());
}
