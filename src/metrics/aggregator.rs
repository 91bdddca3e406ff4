//! In-process metrics aggregator
//!
//! One `MetricsAggregator` lives for the whole process. It is constructed
//! explicitly at startup and handed to collaborators behind an `Arc` —
//! there is no global singleton. All series are created lazily on first
//! write and cleared by `reset()`.
//!
//! Every public operation runs to completion without blocking on I/O; the
//! only shared resource is the registry map, guarded by a single `RwLock`.
//! Writers take the write lock, so concurrent increments against the same
//! series are linearizable and `snapshot()` always observes a consistent
//! point-in-time state.

use std::collections::HashMap;

use parking_lot::RwLock;
use rand::RngExt;
use tracing::debug;

use crate::errors::{MetricsError, Result};

use super::exposition;
use super::labels::{canonical_key, label_set};
use super::snapshot::{
    CounterSnapshot, CustomRecord, GaugeSnapshot, HistogramSnapshot, HistogramStats,
    MetricsSnapshot, Percentiles,
};

pub struct MetricsAggregator {
    /// Histogram sample cap per series. 0 means exact unbounded retention;
    /// otherwise a uniform reservoir of this size is kept (count/sum/min/max
    /// stay exact, percentiles become approximate).
    max_samples: usize,
    inner: RwLock<Registry>,
}

#[derive(Default)]
struct Registry {
    counters: HashMap<String, ScalarSeries>,
    gauges: HashMap<String, ScalarSeries>,
    histograms: HashMap<String, HistogramSeries>,
    custom: Vec<CustomRecord>,
}

/// Shared shape for counters and gauges: an unlabeled value plus
/// per-label-set values keyed by the canonical label key.
#[derive(Default)]
struct ScalarSeries {
    value: f64,
    labeled: HashMap<String, f64>,
}

#[derive(Default)]
struct HistogramSeries {
    /// Canonical label key -> state. Unlabeled observations use the
    /// empty key.
    series: HashMap<String, HistogramState>,
}

struct HistogramState {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    samples: Vec<f64>,
}

impl HistogramState {
    fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            samples: Vec::new(),
        }
    }

    /// O(1) aggregate update plus sample retention. With a cap in place
    /// this is Algorithm R reservoir sampling over the series lifetime.
    fn observe(&mut self, value: f64, max_samples: usize) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        if max_samples == 0 || self.samples.len() < max_samples {
            self.samples.push(value);
        } else {
            let slot = rand::rng().random_range(0..self.count);
            if (slot as usize) < max_samples {
                self.samples[slot as usize] = value;
            }
        }
    }
}

impl MetricsAggregator {
    /// Aggregator with exact unbounded histogram retention.
    pub fn new() -> Self {
        Self::with_max_samples(0)
    }

    /// Aggregator that caps retained histogram samples per series.
    pub fn with_max_samples(max_samples: usize) -> Self {
        Self {
            max_samples,
            inner: RwLock::new(Registry::default()),
        }
    }

    /// Add `amount` to the counter `name`. The unlabeled running total
    /// always accumulates; when `labels` is non-empty the canonicalized
    /// label series accumulates as well. Counters are monotonic, so a
    /// negative or non-finite amount is rejected.
    pub fn increment(&self, name: &str, amount: f64, labels: &[(&str, &str)]) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(MetricsError::invalid_argument(format!(
                "counter '{}' increment must be a non-negative finite number, got {}",
                name, amount
            )));
        }

        let mut inner = self.inner.write();
        let series = inner.counters.entry(name.to_string()).or_default();
        series.value += amount;
        if !labels.is_empty() {
            let key = canonical_key(&label_set(labels));
            *series.labeled.entry(key).or_insert(0.0) += amount;
        }
        Ok(())
    }

    /// Overwrite the gauge `name` with `value` (last-write-wins). The
    /// name-level value is overwritten on every call; when `labels` is
    /// non-empty the labeled sub-series is overwritten as well. No sign
    /// or monotonicity constraint, but the value must be finite.
    pub fn set_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) -> Result<()> {
        check_finite("gauge", name, value)?;

        let mut inner = self.inner.write();
        let series = inner.gauges.entry(name.to_string()).or_default();
        series.value = value;
        if !labels.is_empty() {
            let key = canonical_key(&label_set(labels));
            series.labeled.insert(key, value);
        }
        Ok(())
    }

    /// Record one histogram observation for `name` and the given label set.
    pub fn observe(&self, name: &str, value: f64, labels: &[(&str, &str)]) -> Result<()> {
        check_finite("histogram", name, value)?;

        let key = canonical_key(&label_set(labels));
        let mut inner = self.inner.write();
        let series = inner.histograms.entry(name.to_string()).or_default();
        series
            .series
            .entry(key)
            .or_insert_with(HistogramState::new)
            .observe(value, self.max_samples);
        Ok(())
    }

    /// Append an ad hoc metric entry. Entries are kept verbatim in
    /// insertion order and never aggregated.
    pub fn record(&self, name: &str, value: f64, labels: &[(&str, &str)]) -> Result<()> {
        check_finite("custom metric", name, value)?;

        let record = CustomRecord {
            name: name.to_string(),
            value,
            labels: label_set(labels),
            timestamp: chrono::Utc::now(),
        };
        self.inner.write().custom.push(record);
        Ok(())
    }

    /// Consistent point-in-time view of every series. Never-written series
    /// are simply absent; an untouched aggregator yields an empty snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.read();
        let mut snapshot = MetricsSnapshot::default();

        for (name, series) in &inner.counters {
            snapshot.counters.insert(
                name.clone(),
                CounterSnapshot {
                    value: series.value,
                    labels: series
                        .labeled
                        .iter()
                        .map(|(k, v)| (k.clone(), *v))
                        .collect(),
                },
            );
        }

        for (name, series) in &inner.gauges {
            snapshot.gauges.insert(
                name.clone(),
                GaugeSnapshot {
                    value: series.value,
                    labels: series
                        .labeled
                        .iter()
                        .map(|(k, v)| (k.clone(), *v))
                        .collect(),
                },
            );
        }

        for (name, series) in &inner.histograms {
            snapshot
                .histograms
                .insert(name.clone(), summarize_histogram(series));
        }

        snapshot.custom = inner.custom.clone();
        snapshot
    }

    /// Prometheus text exposition of the current snapshot. Rendering never
    /// fails; with no series written the document is empty but valid.
    pub fn export(&self) -> String {
        exposition::render(&self.snapshot())
    }

    /// JSON rendering of the current snapshot, for the admin surface.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Clear every counter, gauge, histogram, and custom record.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        *inner = Registry::default();
        debug!("metrics aggregator reset to empty state");
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_finite(kind: &str, name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(MetricsError::invalid_argument(format!(
            "{} '{}' value must be finite, got {}",
            kind, name, value
        )));
    }
    Ok(())
}

fn summarize_histogram(series: &HistogramSeries) -> HistogramSnapshot {
    let mut count = 0u64;
    let mut sum = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut all_samples: Vec<f64> = Vec::new();
    let mut per_series = std::collections::BTreeMap::new();

    for (key, state) in &series.series {
        count += state.count;
        sum += state.sum;
        min = min.min(state.min);
        max = max.max(state.max);
        all_samples.extend_from_slice(&state.samples);
        per_series.insert(key.clone(), stats_for(state));
    }

    all_samples.sort_by(f64::total_cmp);

    HistogramSnapshot {
        count,
        sum,
        average: if count > 0 { sum / count as f64 } else { 0.0 },
        min: if count > 0 { min } else { 0.0 },
        max: if count > 0 { max } else { 0.0 },
        percentiles: percentiles_of(&all_samples),
        series: per_series,
    }
}

fn stats_for(state: &HistogramState) -> HistogramStats {
    let mut sorted = state.samples.clone();
    sorted.sort_by(f64::total_cmp);

    HistogramStats {
        count: state.count,
        sum: state.sum,
        average: if state.count > 0 {
            state.sum / state.count as f64
        } else {
            0.0
        },
        min: if state.count > 0 { state.min } else { 0.0 },
        max: if state.count > 0 { state.max } else { 0.0 },
        percentiles: percentiles_of(&sorted),
    }
}

fn percentiles_of(sorted: &[f64]) -> Percentiles {
    Percentiles {
        p50: percentile(sorted, 50.0),
        p90: percentile(sorted, 90.0),
        p99: percentile(sorted, 99.0),
    }
}

/// Nearest-rank percentile over an ascending-sorted sample slice:
/// rank = ceil(p/100 * n) - 1, clamped to [0, n-1].
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    let rank = ((p / 100.0 * n as f64).ceil() as usize)
        .saturating_sub(1)
        .min(n - 1);
    sorted[rank]
}
