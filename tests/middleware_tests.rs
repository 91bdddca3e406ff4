//! HTTP integration tests
//!
//! Exercises the timing middleware and the health/metrics endpoints through
//! an in-memory actix-web app wired the same way as `main`.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpResponse, web};
use std::sync::Arc;
use std::sync::Once;

use tripmetrics::api::middleware::TimingMiddleware;
use tripmetrics::api::services::{AppStartTime, health_routes};
use tripmetrics::config::init_config;
use tripmetrics::metrics::{MetricsAggregator, MetricsRecorder};

static INIT: Once = Once::new();

fn init_test_env() {
    INIT.call_once(|| {
        init_config();
    });
}

fn test_app_start() -> AppStartTime {
    AppStartTime {
        start_datetime: chrono::Utc::now(),
    }
}

async fn demo_handler() -> HttpResponse {
    HttpResponse::Ok().body("trip data")
}

// =============================================================================
// Timing middleware
// =============================================================================

#[actix_rt::test]
async fn test_middleware_records_request_count_and_duration() {
    init_test_env();
    let metrics = Arc::new(MetricsAggregator::new());
    let recorder: Arc<dyn MetricsRecorder> = metrics.clone();

    let app = test::init_service(
        App::new()
            .wrap(TimingMiddleware::new(recorder))
            .route("/api/trips", web::get().to(demo_handler)),
    )
    .await;

    for _ in 0..3 {
        let resp = test::call_service(&app, TestRequest::get().uri("/api/trips").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let snapshot = metrics.snapshot();
    let requests = &snapshot.counters["http_requests_total"];
    assert_eq!(requests.value, 3.0);
    assert_eq!(
        requests.labels[r#"endpoint="api",method="GET",status="200""#],
        3.0
    );

    let durations = &snapshot.histograms["http_request_duration_ms"];
    assert_eq!(durations.count, 3);
    assert!(durations.min >= 0.0);

    // All requests finished, so the in-flight gauge is back to zero
    assert_eq!(snapshot.gauges["http_active_connections"].value, 0.0);
}

#[actix_rt::test]
async fn test_middleware_labels_not_found_responses() {
    init_test_env();
    let metrics = Arc::new(MetricsAggregator::new());
    let recorder: Arc<dyn MetricsRecorder> = metrics.clone();

    let app = test::init_service(
        App::new()
            .wrap(TimingMiddleware::new(recorder))
            .route("/api/trips", web::get().to(demo_handler)),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let snapshot = metrics.snapshot();
    assert_eq!(
        snapshot.counters["http_requests_total"].labels
            [r#"endpoint="other",method="GET",status="404""#],
        1.0
    );
}

// =============================================================================
// Health and metrics endpoints
// =============================================================================

#[actix_rt::test]
async fn test_health_endpoints() {
    init_test_env();
    let metrics = Arc::new(MetricsAggregator::new());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(test_app_start()))
            .service(health_routes("/health")),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");

    let resp = test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, TestRequest::get().uri("/health/live").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn test_metrics_endpoint_returns_exposition_text() {
    init_test_env();
    let metrics = Arc::new(MetricsAggregator::new());
    metrics
        .increment("http_requests_total", 1.0, &[("method", "GET")])
        .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(test_app_start()))
            .service(health_routes("/health")),
    )
    .await;

    let resp =
        test::call_service(&app, TestRequest::get().uri("/health/metrics").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    assert!(content_type.contains("version=0.0.4"));

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("# TYPE http_requests_total counter"));
    // The handler refreshes uptime before rendering
    assert!(text.contains("# TYPE uptime_seconds gauge"));
}

#[actix_rt::test]
async fn test_snapshot_endpoint_returns_json() {
    init_test_env();
    let metrics = Arc::new(MetricsAggregator::new());
    metrics.record("custom_metric", 42.0, &[("service", "api")]).unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(test_app_start()))
            .service(health_routes("/health")),
    )
    .await;

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/health/metrics/snapshot").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["custom"][0]["name"], "custom_metric");
    assert_eq!(body["custom"][0]["value"], 42.0);
    assert_eq!(body["custom"][0]["labels"]["service"], "api");
}

#[actix_rt::test]
async fn test_reset_endpoint_clears_aggregator() {
    init_test_env();
    let metrics = Arc::new(MetricsAggregator::new());
    metrics.increment("c", 5.0, &[]).unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::new(test_app_start()))
            .service(health_routes("/health")),
    )
    .await;

    let resp = test::call_service(
        &app,
        TestRequest::post().uri("/health/metrics/reset").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(metrics.snapshot().is_empty());
}
