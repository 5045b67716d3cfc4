//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use health::{
    Database, FixedDiskStats, HealthAggregator, InMemoryCache, InMemoryDatabase, PingReply,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Helper to build the app over in-memory probes with the disk at `percent`.
fn setup(percent: u8) -> (axum::Router, InMemoryDatabase, InMemoryCache) {
    let database = InMemoryDatabase::new();
    let cache = InMemoryCache::new();
    let aggregator = HealthAggregator::new(Arc::new(database.clone()), Arc::new(cache.clone()))
        .with_disk(Arc::new(FixedDiskStats::with_percent_used(percent)));
    let app = api::create_app(Arc::new(aggregator), get_metrics_handle());
    (app, database, cache)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_healthy_returns_200() {
    let (app, _, _) = setup(50);

    let (status, json) = get(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_degraded_returns_200() {
    let (app, _, _) = setup(85);

    let (status, json) = get(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["disk_space"]["status"], "degraded");
    assert_eq!(
        json["checks"]["disk_space"]["message"],
        "Disk space warning: 85% used"
    );
}

#[tokio::test]
async fn test_database_failure_returns_503() {
    let (app, database, _) = setup(50);
    database.set_fail_with(Some("conn refused"));

    let (status, json) = get(app, "/api/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["checks"]["database"]["status"], "unhealthy");
    assert!(
        json["checks"]["database"]["message"]
            .as_str()
            .unwrap()
            .contains("conn refused")
    );
}

#[tokio::test]
async fn test_cache_failure_returns_503() {
    let (app, _, cache) = setup(50);
    cache.set_reply(PingReply::Text("-LOADING".to_string()));

    let (status, json) = get(app, "/api/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["checks"]["cache"]["message"], "Cache ping failed");
}

#[tokio::test]
async fn test_json_response_structure() {
    let (app, _, _) = setup(50);

    let (_, json) = get(app, "/api/health/default").await;

    assert!(json["status"].is_string());
    assert!(json["timestamp"].is_i64());
    let checks = json["checks"].as_object().unwrap();
    for name in ["database", "cache", "disk_space", "runtime"] {
        assert!(checks.contains_key(name), "missing check {name}");
        assert!(checks[name]["status"].is_string());
        assert!(checks[name]["message"].is_string());
    }
    assert_eq!(json["checks"]["disk_space"]["percent_used"], 50);
    assert!(json["checks"]["runtime"]["version"].is_string());
    assert!(json["checks"]["runtime"]["required"].is_string());
}

struct PanickingDatabase;

#[async_trait]
impl Database for PanickingDatabase {
    async fn execute(&self, _query: &str) -> health::Result<bool> {
        panic!("driver bug");
    }
}

#[tokio::test]
async fn test_handler_panic_returns_500_json() {
    let aggregator = HealthAggregator::new(Arc::new(PanickingDatabase), Arc::new(InMemoryCache::new()))
        .with_disk(Arc::new(FixedDiskStats::with_percent_used(50)));
    let app = api::create_app(Arc::new(aggregator), get_metrics_handle());

    let (status, json) = get(app, "/api/health").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "health check failed");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _, _) = setup(50);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint_reports_probe_counters() {
    let (app, _, _) = setup(50);

    // Produce at least one report so the counters exist.
    get(app.clone(), "/api/health").await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("health_checks_total"), "{text}");
    assert!(text.contains("health_reports_total"), "{text}");
}
