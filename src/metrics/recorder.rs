//! MetricsRecorder trait for dependency injection
//!
//! This trait abstracts the metrics recording interface, allowing:
//! - Production use with the in-process `MetricsAggregator`
//! - Testing with NoopMetrics or custom mock implementations
//! - Better testability and module decoupling

use std::sync::Arc;

use tracing::warn;

use super::MetricsAggregator;

/// Trait for recording application metrics.
///
/// All methods are no-op by default, allowing partial implementation.
/// Implementations must be thread-safe (Send + Sync).
#[allow(unused_variables)]
pub trait MetricsRecorder: Send + Sync {
    // ===== HTTP (timing middleware) =====

    /// Record HTTP request
    fn inc_http_request(&self, method: &str, endpoint: &str, status: &str) {}

    /// Observe HTTP request duration in milliseconds
    fn observe_http_request(&self, method: &str, endpoint: &str, status: &str, duration_ms: f64) {}

    /// Set current number of in-flight HTTP requests
    fn set_active_connections(&self, count: f64) {}

    // ===== Database =====

    /// Record database query
    fn inc_db_query(&self, operation: &str) {}

    /// Record database query failure
    fn inc_db_error(&self, operation: &str) {}

    /// Observe database query duration in milliseconds
    fn observe_db_query(&self, operation: &str, duration_ms: f64) {}
}

/// Noop metrics implementation for testing and metrics-less wiring.
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {}

impl NoopMetrics {
    pub fn new() -> Self {
        Self
    }

    pub fn arc() -> Arc<dyn MetricsRecorder> {
        Arc::new(Self::new())
    }
}

impl Default for NoopMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// The aggregator maps recorder calls onto the well-known series names
/// scraped by operational tooling. Inputs on these paths are always finite
/// and non-negative, so a rejected write indicates a caller bug; it is
/// logged and dropped rather than bubbled into the request path.
impl MetricsRecorder for MetricsAggregator {
    fn inc_http_request(&self, method: &str, endpoint: &str, status: &str) {
        log_rejected(self.increment(
            "http_requests_total",
            1.0,
            &[("method", method), ("endpoint", endpoint), ("status", status)],
        ));
    }

    fn observe_http_request(&self, method: &str, endpoint: &str, status: &str, duration_ms: f64) {
        log_rejected(self.observe(
            "http_request_duration_ms",
            duration_ms,
            &[("method", method), ("endpoint", endpoint), ("status", status)],
        ));
    }

    fn set_active_connections(&self, count: f64) {
        log_rejected(self.set_gauge("http_active_connections", count, &[]));
    }

    fn inc_db_query(&self, operation: &str) {
        log_rejected(self.increment("database_queries_total", 1.0, &[("operation", operation)]));
    }

    fn inc_db_error(&self, operation: &str) {
        log_rejected(self.increment("database_errors_total", 1.0, &[("operation", operation)]));
    }

    fn observe_db_query(&self, operation: &str, duration_ms: f64) {
        log_rejected(self.observe(
            "database_query_duration_ms",
            duration_ms,
            &[("operation", operation)],
        ));
    }
}

fn log_rejected(result: crate::errors::Result<()>) {
    if let Err(e) = result {
        warn!("metrics write rejected: {}", e);
    }
}
