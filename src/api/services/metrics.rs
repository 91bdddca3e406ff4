//! Metrics endpoints
//!
//! Exposes the aggregator in Prometheus text format at
//! `{health_prefix}/metrics`, the JSON snapshot at `/metrics/snapshot`,
//! and the administrative reset at `/metrics/reset`.

use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{info, trace};

use crate::metrics::MetricsAggregator;

use super::health::AppStartTime;

/// Metrics service handler
pub struct MetricsService;

impl MetricsService {
    /// Handle Prometheus exposition request
    pub async fn metrics(
        metrics: web::Data<Arc<MetricsAggregator>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received metrics export request");

        // Refresh uptime before rendering
        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as f64;
        if let Err(e) = metrics.set_gauge("uptime_seconds", uptime, &[]) {
            tracing::warn!("Failed to set uptime gauge: {}", e);
        }

        let output = metrics.export();

        HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4; charset=utf-8")
            .body(output)
    }

    /// Handle JSON snapshot request (admin/debug surface)
    pub async fn snapshot(metrics: web::Data<Arc<MetricsAggregator>>) -> impl Responder {
        trace!("Received metrics snapshot request");
        match metrics.export_json() {
            Ok(body) => HttpResponse::Ok()
                .content_type("application/json; charset=utf-8")
                .body(body),
            Err(e) => {
                tracing::error!("Failed to serialize metrics snapshot: {}", e);
                HttpResponse::InternalServerError().body(e.format_simple())
            }
        }
    }

    /// Handle administrative reset request
    pub async fn reset(metrics: web::Data<Arc<MetricsAggregator>>) -> impl Responder {
        metrics.reset();
        info!("Metrics reset via admin endpoint");
        HttpResponse::NoContent().finish()
    }
}
