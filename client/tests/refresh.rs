//! Token refresh behavior of the authenticated client against a mock API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use pipo_console_client::{ApiClient, ApiError, ApiRequest, ClientConfig};
use pipo_console_core::routing::resolve_path;
use pipo_console_core::{MemoryStorage, Pass, Screen, SessionStore};
use pipo_console_testing::{fixtures, init_tracing};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, session: SessionStore) -> ApiClient {
    ApiClient::new(&ClientConfig::new(server.uri()), session).unwrap()
}

fn logged_in_session(access: &str, refresh: &str) -> SessionStore {
    let session = SessionStore::new(MemoryStorage::new());
    session
        .set_session(access, refresh, &fixtures::resident("Anna Smirnova", "12"))
        .unwrap();
    session
}

async fn mount_passes(server: &MockServer, token: &str, status: u16, passes: &[Pass]) {
    Mock::given(method("GET"))
        .and(path("/passes"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(passes))
        .mount(server)
        .await;
}

async fn refresh_calls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/auth/refresh")
        .count()
}

#[tokio::test]
async fn test_login_attaches_bearer_to_later_requests() {
    init_tracing();
    let server = MockServer::start().await;
    let guard = fixtures::guard("Ivan Petrov");

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "guard@pipo.local",
            "password": "secret1"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::login_response("a1", "r1", &guard)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_passes(&server, "a1", 200, &[]).await;

    let session = SessionStore::new(MemoryStorage::new());
    let client = client_for(&server, session.clone());

    let user = client.login("guard@pipo.local", "secret1").await.unwrap();
    assert_eq!(user, guard);
    assert_eq!(session.access_token().as_deref(), Some("a1"));
    assert_eq!(session.refresh_token().as_deref(), Some("r1"));
    assert_eq!(session.user(), Some(guard));

    let passes = client.list_passes(Default::default()).await.unwrap();
    assert!(passes.is_empty());
    assert_eq!(client.refreshes_started(), 0);
}

#[tokio::test]
async fn test_failed_login_does_not_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(fixtures::error_body("invalid credentials")))
        .mount(&server)
        .await;

    let session = logged_in_session("old", "r-old");
    let client = client_for(&server, session.clone());

    let err = client.login("guard@pipo.local", "wrong-pass").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(refresh_calls(&server).await, 0);
    // The previous session is left alone
    assert_eq!(session.access_token().as_deref(), Some("old"));
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_and_request_resent() {
    let server = MockServer::start().await;
    let owner = fixtures::resident("Anna Smirnova", "12");
    let passes = vec![fixtures::pass(&owner, "A123BC77")];

    mount_passes(&server, "a1", 401, &[]).await;
    mount_passes(&server, "a2", 200, &passes).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(serde_json::json!({ "refresh_token": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::token_pair("a2", "r2")))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session("a1", "r1");
    let client = client_for(&server, session.clone());

    let fetched = client.list_passes(Default::default()).await.unwrap();
    assert_eq!(fetched, passes);
    assert_eq!(session.access_token().as_deref(), Some("a2"));
    assert_eq!(session.refresh_token().as_deref(), Some("r2"));
    assert!(session.user().is_some());
}

#[tokio::test]
async fn test_refresh_request_carries_no_bearer() {
    let server = MockServer::start().await;
    mount_passes(&server, "a1", 401, &[]).await;
    mount_passes(&server, "a2", 200, &[]).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::token_pair("a2", "r2")))
        .mount(&server)
        .await;

    let client = client_for(&server, logged_in_session("a1", "r1"));
    client.list_passes(Default::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == "/auth/refresh")
        .expect("refresh was called");
    assert!(!refresh.headers.contains_key("authorization"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    mount_passes(&server, "a1", 401, &[]).await;
    mount_passes(&server, "a2", 200, &[]).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(fixtures::token_pair("a2", "r2"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session("a1", "r1");
    let client = client_for(&server, session.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.list_passes(Default::default()).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(refresh_calls(&server).await, 1);
    assert_eq!(client.refreshes_started(), 1);
    assert_eq!(session.access_token().as_deref(), Some("a2"));
}

#[tokio::test]
async fn test_late_401_reuses_settled_refresh() {
    let server = MockServer::start().await;
    mount_passes(&server, "a1", 401, &[]).await;
    mount_passes(&server, "a2", 200, &[]).await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("Authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::token_pair("a2", "r2")))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session("a1", "r1");
    let client = client_for(&server, session.clone());

    // Both leave with a1; the /users rejection lands after the refresh settled
    let (passes, users) = tokio::join!(
        client.list_passes(Default::default()),
        client.list_users(Default::default())
    );
    assert!(passes.unwrap().is_empty());
    assert!(users.unwrap().is_empty());

    assert_eq!(refresh_calls(&server).await, 1);
    assert_eq!(client.refreshes_started(), 1);
    assert_eq!(session.refresh_token().as_deref(), Some("r2"));
}

#[tokio::test]
async fn test_retried_request_is_not_refreshed_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/passes"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::token_pair("a2", "r2")))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session("a1", "r1");
    let client = client_for(&server, session.clone());

    let err = client.list_passes(Default::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(refresh_calls(&server).await, 1);
    // The refresh itself succeeded, so the session holds the new pair
    assert_eq!(session.access_token().as_deref(), Some("a2"));
}

#[tokio::test]
async fn test_refresh_endpoint_401_is_not_recovered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session("a1", "r1");
    let client = client_for(&server, session.clone());

    let request = ApiRequest::post("/auth/refresh")
        .with_json(&serde_json::json!({ "refresh_token": "r1" }))
        .unwrap();
    let err = client.send(request).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(client.refreshes_started(), 0);
    assert_eq!(session.access_token().as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_missing_refresh_token_fails_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/passes"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::token_pair("a2", "r2")))
        .expect(0)
        .mount(&server)
        .await;

    let session = SessionStore::new(MemoryStorage::new());
    let client = client_for(&server, session.clone());

    let err = client.list_passes(Default::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingCredential));
    assert!(err.is_forced_logout());
    assert!(session.snapshot().is_none());
}

#[tokio::test]
async fn test_rejected_refresh_clears_session() {
    let server = MockServer::start().await;
    mount_passes(&server, "a1", 401, &[]).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(fixtures::error_body("invalid refresh token")))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session("a1", "r1");
    let client = client_for(&server, session.clone());

    let err = client.list_passes(Default::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::RefreshFailed(_)));

    assert!(session.access_token().is_none());
    assert!(session.refresh_token().is_none());
    assert!(session.user().is_none());
    assert_eq!(resolve_path("/resident", &session).screen(), Screen::Login);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_refresh_failure() {
    let server = MockServer::start().await;
    mount_passes(&server, "a1", 401, &[]).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let session = logged_in_session("a1", "r1");
    let client = client_for(&server, session.clone());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.list_passes(Default::default()).await })
        })
        .collect();

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::RefreshFailed(_)), "{err:?}");
    }
    assert!(session.snapshot().is_none());
}

#[tokio::test]
async fn test_next_expiry_starts_a_new_refresh() {
    let server = MockServer::start().await;
    mount_passes(&server, "a1", 401, &[]).await;
    mount_passes(&server, "a2", 200, &[]).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::token_pair("a2", "r2")))
        .expect(2)
        .mount(&server)
        .await;

    let session = logged_in_session("a1", "r1");
    let client = client_for(&server, session.clone());

    client.list_passes(Default::default()).await.unwrap();
    // Simulate the new token expiring as well
    session.set_tokens("a1", "r2").unwrap();
    client.list_passes(Default::default()).await.unwrap();

    assert_eq!(client.refreshes_started(), 2);
}

#[tokio::test]
async fn test_other_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/passes"))
        .respond_with(ResponseTemplate::new(403).set_body_json(fixtures::error_body("forbidden")))
        .mount(&server)
        .await;

    let client = client_for(&server, logged_in_session("a1", "r1"));
    let err = client.list_passes(Default::default()).await.unwrap_err();

    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "forbidden");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(refresh_calls(&server).await, 0);
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    // Nothing listens on the discard port
    let config = ClientConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
    let client = ApiClient::new(&config, logged_in_session("a1", "r1")).unwrap();

    let err = client.list_passes(Default::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(client.refreshes_started(), 0);
}
