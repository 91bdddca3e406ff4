//! Health endpoints and route wiring
//!
//! Kept simple and dependency-free: k8s probes want fast answers, so the
//! health check reports process uptime and how many series the aggregator
//! is tracking without touching anything that can block.

use actix_web::{HttpResponse, Responder, Scope, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;

use crate::metrics::MetricsAggregator;

use super::metrics::MetricsService;

/// Application start time, stored as app data at server construction.
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    uptime: u32,
    tracked_series: TrackedSeries,
    response_time_ms: u32,
}

#[derive(Serialize)]
struct TrackedSeries {
    counters: usize,
    gauges: usize,
    histograms: usize,
    custom: usize,
}

/// Health Service
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        metrics: web::Data<Arc<MetricsAggregator>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let snapshot = metrics.snapshot();
        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u32;

        let health_data = HealthResponse {
            status: "healthy".to_string(),
            timestamp: now.to_rfc3339(),
            uptime: uptime_seconds,
            tracked_series: TrackedSeries {
                counters: snapshot.counters.len(),
                gauges: snapshot.gauges.len(),
                histograms: snapshot.histograms.len(),
                custom: snapshot.custom.len(),
            },
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        HttpResponse::Ok()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(health_data)
    }

    // Readiness probe, only returns 200
    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain"))
            .body("OK")
    }

    // Liveness probe
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health scope: probes plus the metrics surfaces.
pub fn health_routes(prefix: &str) -> Scope {
    web::scope(prefix)
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
        .route("/metrics", web::get().to(MetricsService::metrics))
        .route("/metrics/snapshot", web::get().to(MetricsService::snapshot))
        .route("/metrics/reset", web::post().to(MetricsService::reset))
}
