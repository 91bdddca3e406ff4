//! Tripmetrics - in-process metrics for the trip guide API
//!
//! This library provides the observability core for the trip guide service:
//! an explicitly-constructed metrics aggregator (counters, gauges,
//! histograms with percentiles, ad hoc records), Prometheus text
//! exposition, and the HTTP plumbing that feeds it.
//!
//! # Architecture
//! - `metrics`: the aggregator, label canonicalization, snapshots, exposition
//! - `api`: HTTP endpoints and the request timing middleware
//! - `storage`: database query instrumentation
//! - `config`: configuration management
//! - `system`: logging initialization
//!
//! One `MetricsAggregator` is created at process start and shared via `Arc`
//! with every collaborator; there is no global singleton.

pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod storage;
pub mod system;
