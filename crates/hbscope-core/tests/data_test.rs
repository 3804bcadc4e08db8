#![allow(clippy::unwrap_used)]
// Bundle and raw-data managers against a mocked backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hbscope_core::{
    Backend, BackendConfig, BundleLookup, ErrorKind, LoginCredentials, MemorySessionStore,
    SessionStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn backend(server: &MockServer) -> Backend {
    backend_with(BackendConfig::new(Url::parse(&server.uri()).unwrap()))
}

fn backend_with(config: BackendConfig) -> Backend {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let backend = Backend::new(config, store).unwrap();
    backend.restore_session();
    backend
}

fn bundle(id: &str, active: bool, verified: &str) -> serde_json::Value {
    json!({
        "id": id,
        "machine_name": format!("bundle-{id}"),
        "tile_name": format!("Bundle {id}"),
        "is_active": active,
        "verification_date": verified,
    })
}

async fn mount_bundles(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/bundles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn login(server: &MockServer, backend: &Backend) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok1",
            "user": {"id": "u1", "username": "alice", "email": "a@x.com", "created_at": "2024-01-01"}
        })))
        .mount(server)
        .await;
    backend
        .session()
        .login(&LoginCredentials::new("alice", "pw"))
        .await
        .unwrap();
}

// ── Bundles ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_featured_bundle_is_not_an_error() {
    let server = MockServer::start().await;
    mount_bundles(
        &server,
        json!([bundle("1", true, "2024-05-01"), bundle("2", false, "2024-04-01")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/bundles/featured"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})))
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.bundles().fetch_data().await.unwrap();

    let state = backend.bundles().state();
    assert_eq!(state.bundles.len(), 2);
    assert_eq!(state.featured, None);
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert_eq!(state.last_update, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single());

    let active: Vec<String> = backend
        .bundles()
        .active_bundles()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(active, vec!["1".to_owned()]);
}

#[tokio::test]
async fn test_featured_bundle_counts_toward_last_update() {
    let server = MockServer::start().await;
    mount_bundles(&server, json!([bundle("1", true, "2024-05-01")])).await;
    Mock::given(method("GET"))
        .and(path("/bundles/featured"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bundle("9", true, "2024-06-10")))
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.bundles().fetch_data().await.unwrap();

    let state = backend.bundles().state();
    assert_eq!(state.featured.map(|b| b.id), Some("9".to_owned()));
    assert_eq!(state.last_update, Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).single());
}

#[tokio::test]
async fn test_featured_server_error_is_not_fatal() {
    let server = MockServer::start().await;
    mount_bundles(&server, json!([bundle("1", true, "2024-05-01")])).await;
    Mock::given(method("GET"))
        .and(path("/bundles/featured"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db locked"})))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let result = backend.bundles().fetch_data().await;

    assert!(result.is_ok(), "got: {result:?}");
    let state = backend.bundles().state();
    assert_eq!(state.bundles.len(), 1);
    assert_eq!(state.featured, None);
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert_eq!(state.last_update, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single());
}

#[tokio::test]
async fn test_list_failure_keeps_previous_bundles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bundles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([bundle("1", true, "2024-05-01")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bundles"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db locked"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bundles/featured"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = backend(&server);
    backend.bundles().fetch_data().await.unwrap();
    let failure = backend.bundles().fetch_data().await.unwrap_err();

    assert_eq!(failure.message, "db locked");
    assert!(matches!(failure.kind, ErrorKind::Server { status: 500, .. }));

    let state = backend.bundles().state();
    assert_eq!(state.bundles.len(), 1);
    assert_eq!(state.error.map(|f| f.message), Some("db locked".to_owned()));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_lookup_by_machine_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bundles/by-machine-name/bundle-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bundle("7", true, "2024-05-01")))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let found = backend
        .bundles()
        .lookup(&BundleLookup::MachineName("bundle-7".into()))
        .await
        .unwrap();

    assert_eq!(found.id, "7");
    assert!(backend.bundles().state().bundles.is_empty());
}

// ── ETL ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_etl_requires_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/etl/run"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let failure = backend.bundles().run_etl().await.unwrap_err();

    assert_eq!(failure.message, "You must be authenticated to run the ETL.");
    let state = backend.bundles().state();
    assert_eq!(state.error.map(|f| f.message), Some(failure.message));
    assert_eq!(state.etl_result, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_etl_run_then_refresh() {
    let server = MockServer::start().await;
    let backend = backend(&server);
    login(&server, &backend).await;

    Mock::given(method("POST"))
        .and(path("/etl/run"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bundles_processed": 3,
            "cleanup_ran": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_bundles(&server, json!([bundle("1", true, "2024-05-01")])).await;
    Mock::given(method("GET"))
        .and(path("/bundles/featured"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = backend.bundles().run_etl().await.unwrap();

    assert_eq!(result.bundles_processed, 3);
    assert!(result.cleanup_ran);
    let state = backend.bundles().state();
    assert_eq!(state.etl_result, Some(result));
    assert_eq!(state.bundles.len(), 1);
    assert_eq!(state.error, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_etl_timeout_message() {
    let server = MockServer::start().await;
    let mut config = BackendConfig::new(Url::parse(&server.uri()).unwrap());
    config.timeout = Duration::from_millis(200);
    config.long_timeout = Duration::from_millis(200);
    let backend = backend_with(config);
    login(&server, &backend).await;

    Mock::given(method("POST"))
        .and(path("/etl/run"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"bundles_processed": 1, "cleanup_ran": false}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let failure = backend.bundles().run_etl().await.unwrap_err();

    assert_eq!(failure.kind, ErrorKind::Timeout);
    assert_eq!(failure.message, "The ETL is taking too long. Please try again.");
    let state = backend.bundles().state();
    assert!(!state.loading);
    assert_eq!(state.etl_result, None);
}

#[tokio::test]
async fn test_etl_server_error_prefers_backend_detail() {
    let server = MockServer::start().await;
    let backend = backend(&server);
    login(&server, &backend).await;

    Mock::given(method("POST"))
        .and(path("/etl/run"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"detail": "spider failed"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/etl/run"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let failure = backend.bundles().run_etl().await.unwrap_err();
    assert_eq!(failure.message, "spider failed");
    assert!(matches!(failure.kind, ErrorKind::Server { status: 502, .. }));

    let failure = backend.bundles().run_etl().await.unwrap_err();
    assert_eq!(failure.message, "Server error: 503");

    let state = backend.bundles().state();
    assert_eq!(state.error.map(|f| f.message), Some("Server error: 503".to_owned()));
    assert_eq!(state.etl_result, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_etl_unreachable_backend() {
    let session = json!({
        "token": "tok1",
        "user": {"id": "u1", "username": "alice", "email": "a@x.com", "created_at": "2024-01-01"}
    });
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::with_value(session.to_string()));
    let config = BackendConfig::new(Url::parse("http://127.0.0.1:1").unwrap());
    let backend = Backend::new(config, store).unwrap();
    backend.restore_session();
    assert!(backend.session().is_authenticated());

    let failure = backend.bundles().run_etl().await.unwrap_err();

    assert_eq!(failure.kind, ErrorKind::Unreachable);
    assert_eq!(
        failure.message,
        "Could not reach the server. Check that the API is running."
    );
    let state = backend.bundles().state();
    assert_eq!(state.error.map(|f| f.message), Some(failure.message));
    assert!(!state.loading);
}

// ── Raw data ────────────────────────────────────────────────────────

fn record(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "json_data": {"bundles": []},
        "scraped_date": "2024-06-01T12:00:00",
        "source_url": "https://example.com/books"
    })
}

#[tokio::test]
async fn test_raw_data_slots_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing-page-raw-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record("a"), record("b")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing-page-raw-data/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record("b")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing-page-raw-data/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Raw data not found"})))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let raw = backend.raw_data();

    assert_eq!(raw.fetch_list().await.unwrap().len(), 2);
    assert_eq!(raw.fetch_latest().await.unwrap().id, "b");

    let failure = raw.fetch_by_id("missing").await.unwrap_err();
    assert_eq!(failure.message, "Raw data not found");

    let state = raw.state();
    assert_eq!(state.list.len(), 2);
    assert_eq!(state.latest.map(|r| r.id), Some("b".to_owned()));
    assert_eq!(state.current, None);
    assert_eq!(state.error.map(|f| f.message), Some("Raw data not found".to_owned()));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_failed_fetch_resets_its_slot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing-page-raw-data/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record("a")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing-page-raw-data/latest"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let raw = backend.raw_data();

    raw.fetch_latest().await.unwrap();
    assert!(raw.state().latest.is_some());

    let failure = raw.fetch_latest().await.unwrap_err();
    assert_eq!(failure.message, "Server error: 500");
    assert_eq!(raw.state().latest, None);

    assert!(!raw.state().loading);
}

#[tokio::test]
async fn test_blank_raw_data_id_never_hits_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let failure = backend.raw_data().fetch_by_id("").await.unwrap_err();

    assert_eq!(failure.message, "Invalid raw data id: must not be empty");
    assert_eq!(backend.raw_data().state().current, None);
}
