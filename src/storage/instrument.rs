//! Database access instrumentation
//!
//! `Instrumented` wraps individual query futures so every database call
//! records a query counter, a duration observation, and an error counter on
//! failure. The storage layer owns one of these next to its connection pool
//! and routes queries through `query()`.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::trace;

use crate::metrics::MetricsRecorder;

#[derive(Clone)]
pub struct Instrumented {
    metrics: Arc<dyn MetricsRecorder>,
}

impl Instrumented {
    pub fn new(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { metrics }
    }

    /// Run one query future and record its outcome.
    ///
    /// `operation` is a low-cardinality tag such as `select` or `insert`,
    /// not the statement text. The wrapped result is returned untouched;
    /// instrumentation never alters query semantics.
    pub async fn query<T, E, F>(&self, operation: &str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let result = fut.await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        self.metrics.inc_db_query(operation);
        self.metrics.observe_db_query(operation, duration_ms);
        if result.is_err() {
            self.metrics.inc_db_error(operation);
        }

        trace!(
            "database operation '{}' finished in {:.3}ms (ok: {})",
            operation,
            duration_ms,
            result.is_ok()
        );

        result
    }
}
