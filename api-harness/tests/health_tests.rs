//! Health checks against real HTTP endpoints and the environment gate

mod common;

use api_harness::error::HarnessError;
use api_harness::health::{HealthChecker, ServiceConfig, ServiceKind};
use api_harness::scenario::{setup_environment, teardown_environment};
use api_harness::store::{InMemoryStore, StoreProbe};
use api_harness::traits::TestDatabase;
use common::init_test_logging;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn health_server(status: u16, delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    let state = if status == 200 { "ok" } else { "degraded" };
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(json!({"status": state}))
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

fn http_service(url: String, timeout: Duration) -> ServiceConfig {
    ServiceConfig {
        url,
        timeout,
        kind: ServiceKind::Http,
    }
}

#[tokio::test]
async fn test_http_checks_report_status_and_body() {
    init_test_logging();
    let healthy = health_server(200, Duration::ZERO).await;
    let degraded = health_server(503, Duration::ZERO).await;

    let mut checker = HealthChecker::new().unwrap();
    checker.add_service_config(
        "api",
        http_service(format!("{}/api/health", healthy.uri()), Duration::from_secs(2)),
    );
    checker.add_service_config(
        "billing",
        http_service(format!("{}/api/health", degraded.uri()), Duration::from_secs(2)),
    );

    let report = checker.check_all_services().await;
    let api = report.get("api").unwrap();
    assert!(api.healthy);
    assert_eq!(api.response, Some(json!({"status": "ok"})));

    let billing = report.get("billing").unwrap();
    assert!(!billing.healthy);
    assert_eq!(billing.error.as_deref(), Some("HTTP 503"));
    assert_eq!(billing.response, Some(json!({"status": "degraded"})));
    assert_eq!(report.unhealthy(), vec!["billing"]);
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    init_test_logging();
    let slow = health_server(200, Duration::from_millis(500)).await;

    let mut checker = HealthChecker::new().unwrap();
    checker.add_service_config(
        "api",
        http_service(format!("{}/api/health", slow.uri()), Duration::from_millis(50)),
    );

    let result = checker.check_service("api").await.unwrap();
    assert!(!result.healthy);
    assert!(result.error.unwrap().contains("timed out"));
    assert!(result.response_time >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_default_tcp_probe() {
    init_test_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut checker = HealthChecker::new().unwrap();
    checker.add_service(
        "redis".to_string(),
        format!("redis://127.0.0.1:{}", port),
        Duration::from_secs(1),
    );
    assert!(checker.check_service("redis").await.unwrap().healthy);

    drop(listener);
    let result = checker.check_service("redis").await.unwrap();
    assert!(!result.healthy);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_environment_gate_uses_store_health() {
    init_test_logging();
    let store = Arc::new(InMemoryStore::new());
    store
        .create_many("customers", vec![json!({"id": "stale"})])
        .await
        .unwrap();

    let mut checker = HealthChecker::new()
        .unwrap()
        .with_poll_interval(Duration::from_millis(20));
    checker.add_service(
        "database".to_string(),
        "postgres://localhost:5432".to_string(),
        Duration::from_millis(200),
    );
    checker.register_probe("database", Arc::new(StoreProbe::new(store.clone())));

    setup_environment(&checker, store.as_ref(), Duration::from_millis(200))
        .await
        .unwrap();
    assert_eq!(store.count("customers", None).await.unwrap(), 0);

    store.set_healthy(false);
    let error = setup_environment(&checker, store.as_ref(), Duration::from_millis(100))
        .await
        .unwrap_err();
    match error {
        HarnessError::ServicesUnavailable { services, .. } => assert_eq!(services, "database"),
        other => panic!("unexpected error: {other}"),
    }

    teardown_environment(store.as_ref()).await.unwrap();
}
