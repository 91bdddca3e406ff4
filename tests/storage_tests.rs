//! Storage instrumentation tests
//!
//! The `Instrumented` wrapper must count queries, time them, and bump the
//! error counter only when the wrapped future fails.

use std::sync::Arc;

use tripmetrics::metrics::MetricsAggregator;
use tripmetrics::storage::Instrumented;

#[tokio::test]
async fn test_successful_query_records_count_and_duration() {
    let metrics = Arc::new(MetricsAggregator::new());
    let db = Instrumented::new(metrics.clone());

    let result: Result<u32, String> = db.query("select", async { Ok(7) }).await;
    assert_eq!(result.unwrap(), 7);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.counters["database_queries_total"].value, 1.0);
    assert_eq!(
        snapshot.counters["database_queries_total"].labels[r#"operation="select""#],
        1.0
    );
    assert_eq!(snapshot.histograms["database_query_duration_ms"].count, 1);
    // No failures, so the error counter was never created
    assert!(!snapshot.counters.contains_key("database_errors_total"));
}

#[tokio::test]
async fn test_failed_query_bumps_error_counter() {
    let metrics = Arc::new(MetricsAggregator::new());
    let db = Instrumented::new(metrics.clone());

    let result: Result<u32, String> = db.query("insert", async { Err("timeout".into()) }).await;
    assert_eq!(result.unwrap_err(), "timeout");

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.counters["database_queries_total"].value, 1.0);
    assert_eq!(snapshot.counters["database_errors_total"].value, 1.0);
    assert_eq!(
        snapshot.counters["database_errors_total"].labels[r#"operation="insert""#],
        1.0
    );
    assert_eq!(snapshot.histograms["database_query_duration_ms"].count, 1);
}

#[tokio::test]
async fn test_duration_reflects_query_time() {
    let metrics = Arc::new(MetricsAggregator::new());
    let db = Instrumented::new(metrics.clone());

    let result: Result<(), ()> = db
        .query("select", async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(())
        })
        .await;
    assert!(result.is_ok());

    let snapshot = metrics.snapshot();
    let histogram = &snapshot.histograms["database_query_duration_ms"];
    assert!(histogram.min >= 15.0, "min={}", histogram.min);
}
