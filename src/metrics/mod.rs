//! Metrics collection and export
//!
//! The aggregator accumulates counters, gauges, and histograms (optionally
//! labeled), keeps ad hoc custom records, and renders Prometheus exposition
//! text for the scrape endpoint.

mod aggregator;
mod exposition;
pub mod labels;
mod recorder;
mod snapshot;

pub use aggregator::MetricsAggregator;
pub use labels::{LabelSet, canonical_key, label_set};
pub use recorder::{MetricsRecorder, NoopMetrics};
pub use snapshot::{
    CounterSnapshot, CustomRecord, GaugeSnapshot, HistogramSnapshot, HistogramStats,
    MetricsSnapshot, Percentiles,
};
