//! Point-in-time snapshot types
//!
//! `MetricsSnapshot` is what `MetricsAggregator::snapshot()` returns: a
//! fully-computed, serializable view with no references back into the
//! aggregator. Labeled sub-series are keyed by their canonical label key.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::labels::LabelSet;

/// Consistent view of every series at one instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, CounterSnapshot>,
    pub gauges: BTreeMap<String, GaugeSnapshot>,
    pub histograms: BTreeMap<String, HistogramSnapshot>,
    pub custom: Vec<CustomRecord>,
}

impl MetricsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
            && self.gauges.is_empty()
            && self.histograms.is_empty()
            && self.custom.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Running total over all increments, labeled or not.
    pub value: f64,
    /// Canonical label key -> per-label-set total.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeSnapshot {
    /// Last value written without labels.
    pub value: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, f64>,
}

/// Distribution statistics for one histogram name, aggregated over every
/// label combination, plus the per-label-set breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    /// Canonical label key -> stats for that series. Unlabeled observations
    /// live under the empty key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub series: BTreeMap<String, HistogramStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramStats {
    pub count: u64,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Percentiles {
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
}

/// Ad hoc metric entry kept verbatim, never aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRecord {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "LabelSet::is_empty")]
    pub labels: LabelSet,
    pub timestamp: DateTime<Utc>,
}
