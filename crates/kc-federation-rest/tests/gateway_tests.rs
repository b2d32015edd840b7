//! Gateway tests against a mock REST directory.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use kc_federation_rest::RestError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{config, gateway, gateway_with, init_tracing, unresponsive};

// =============================================================================
// Authenticate
// =============================================================================

#[tokio::test]
async fn authenticate_accepts_on_success_status() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .and(header("Content-Type", "application/json"))
        .and(header("Accept", "application/json"))
        .and(header("Connection", "keep-alive"))
        .and(body_json(json!({ "username": "alice", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server);
    assert!(gw.authenticate("alice", "s3cret").await.unwrap());
    assert_eq!(gw.stats().leased, 0);
}

#[tokio::test]
async fn authenticate_rejects_on_any_other_status() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!gateway(&server).authenticate("alice", "wrong").await.unwrap());
}

// =============================================================================
// Lookup
// =============================================================================

#[tokio::test]
async fn find_user_returns_record() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "alice",
            "email": "alice@example.com",
            "firstName": "Alice"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = gateway(&server)
        .find_user_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.username(), "alice");
    assert_eq!(record.email().as_deref(), Some("alice@example.com"));
    assert_eq!(record.first_name().as_deref(), Some("Alice"));
}

#[tokio::test]
async fn find_user_reads_error_status_as_missing() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let gw = gateway(&server);
    assert!(gw.find_user_by_username("ghost").await.unwrap().is_none());
    assert!(gw.find_user_by_username("broken").await.unwrap().is_none());
}

#[tokio::test]
async fn find_user_with_malformed_body_is_opaque_failure() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = gateway(&server)
        .find_user_by_username("alice")
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::BackendAuthentication));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn find_users_passes_filter() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("username", "ali"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "username": "alice" },
            { "username": "alina" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let users = gateway(&server).find_users(Some("ali")).await.unwrap();
    let names: Vec<_> = users.iter().map(|u| u.username()).collect();
    assert_eq!(names, ["alice", "alina"]);
}

#[tokio::test]
async fn find_users_without_filter_lists_everything() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(gateway(&server).find_users(None).await.unwrap().is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn find_users_fails_on_error_status() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway(&server).find_users(None).await.unwrap_err();
    assert!(matches!(err, RestError::Backend { status: 503 }));
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn set_attribute_patches_one_field() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/users/alice"))
        .and(body_json(json!({ "department": "eng" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server)
        .set_user_attribute("alice", "department", "eng")
        .await
        .unwrap();
}

#[tokio::test]
async fn write_operations_fail_on_error_status() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let gw = gateway(&server);
    assert!(matches!(
        gw.set_user_attribute("alice", "x", "y").await,
        Err(RestError::Backend { status: 400 })
    ));
    assert!(matches!(
        gw.create_user("alice").await,
        Err(RestError::Backend { status: 409 })
    ));
    assert!(matches!(
        gw.delete_user("alice").await,
        Err(RestError::Backend { status: 404 })
    ));
}

#[tokio::test]
async fn create_user_returns_directory_record() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({ "username": "bob" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "username": "bob",
            "enabled": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = gateway(&server).create_user("bob").await.unwrap();
    assert_eq!(record.username(), "bob");
    assert!(!record.enabled());
}

#[tokio::test]
async fn create_user_without_body_synthesizes_record() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let record = gateway(&server).create_user("bob").await.unwrap();
    assert_eq!(record.username(), "bob");
    assert_eq!(record.as_map().len(), 1);
}

#[tokio::test]
async fn delete_user_succeeds_on_no_content() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/alice"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server).delete_user("alice").await.unwrap();
}

// =============================================================================
// Timeouts and pool
// =============================================================================

#[tokio::test]
async fn stalled_response_is_opaque_failure() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "username": "slow" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut settings = config(&server);
    settings.socket_timeout = Duration::from_millis(100);
    let gw = gateway_with(settings);

    let err = gw.find_user_by_username("slow").await.unwrap_err();
    assert!(matches!(err, RestError::BackendAuthentication));
    assert_eq!(err.to_string(), "BACKEND_AUTHENTICATION_ERROR");
    assert_eq!(gw.stats().leased, 0);
}

#[tokio::test]
async fn exhausted_pool_is_opaque_failure() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "username": "slow" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut settings = config(&server);
    settings.max_connections = 1;
    settings.connection_request_timeout = Duration::from_millis(50);
    settings.socket_timeout = Duration::from_secs(5);
    let gw = gateway_with(settings);

    let first = {
        let gw = Arc::clone(&gw);
        tokio::spawn(async move { gw.find_user_by_username("slow").await })
    };
    for _ in 0..100 {
        if gw.stats().leased == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(gw.stats().leased, 1);

    let err = gw.find_user_by_username("other").await.unwrap_err();
    assert!(matches!(err, RestError::BackendAuthentication));

    let record = first.await.unwrap().unwrap().unwrap();
    assert_eq!(record.username(), "slow");
    assert_eq!(gw.stats().leased, 0);
    assert_eq!(gw.stats().available, 1);
}

#[tokio::test]
async fn unreachable_directory_is_opaque_failure() {
    init_tracing();
    let server = MockServer::start().await;
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut settings = config(&server);
    settings.base_url = format!("http://127.0.0.1:{port}");
    let err = gateway_with(settings)
        .authenticate("alice", "s3cret")
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::BackendAuthentication));
}

#[tokio::test]
async fn connect_timeout_is_opaque_failure() {
    init_tracing();
    let server = MockServer::start().await;
    let Some(stalled) = unresponsive() else {
        return;
    };

    let mut settings = config(&server);
    settings.base_url = stalled.base_url();
    settings.connect_timeout = Duration::from_millis(300);
    let gw = gateway_with(settings);

    let started = Instant::now();
    let err = gw.authenticate("alice", "s3cret").await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, RestError::BackendAuthentication));
    assert!(elapsed >= Duration::from_millis(250), "gave up after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "gave up after {elapsed:?}");
    assert_eq!(gw.stats().leased, 0);
}
