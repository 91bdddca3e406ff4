//! Prometheus text exposition rendering
//!
//! Renders a `MetricsSnapshot` into the plain-text format scraped by
//! Prometheus-compatible tooling (`text/plain; version=0.0.4`). Each series
//! gets a `# TYPE` line followed by one sample line per label combination.
//! Histograms emit `quantile`-labeled lines plus `_sum` and `_count`, which
//! is enough to reconstruct average and percentiles on the scraping side.

use std::fmt::Write;

use super::snapshot::{HistogramStats, MetricsSnapshot};

const QUANTILES: [(&str, fn(&HistogramStats) -> f64); 3] = [
    ("0.5", |s| s.percentiles.p50),
    ("0.9", |s| s.percentiles.p90),
    ("0.99", |s| s.percentiles.p99),
];

/// Render the full exposition document. Infallible: an empty snapshot
/// produces an empty (but valid) document.
pub fn render(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();

    for (name, counter) in &snapshot.counters {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let _ = writeln!(out, "{} {}", name, format_value(counter.value));
        for (key, value) in &counter.labels {
            let _ = writeln!(out, "{}{{{}}} {}", name, key, format_value(*value));
        }
    }

    for (name, gauge) in &snapshot.gauges {
        let _ = writeln!(out, "# TYPE {} gauge", name);
        let _ = writeln!(out, "{} {}", name, format_value(gauge.value));
        for (key, value) in &gauge.labels {
            let _ = writeln!(out, "{}{{{}}} {}", name, key, format_value(*value));
        }
    }

    for (name, histogram) in &snapshot.histograms {
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for (key, stats) in &histogram.series {
            for (quantile, pick) in QUANTILES {
                let _ = writeln!(
                    out,
                    "{}{{{}}} {}",
                    name,
                    join_labels(key, &format!("quantile=\"{}\"", quantile)),
                    format_value(pick(stats))
                );
            }
            let _ = writeln!(out, "{}_sum{} {}", name, braces(key), format_value(stats.sum));
            let _ = writeln!(out, "{}_count{} {}", name, braces(key), stats.count);
        }
    }

    out
}

/// Append an extra label to an existing canonical label body.
fn join_labels(key: &str, extra: &str) -> String {
    if key.is_empty() {
        extra.to_string()
    } else {
        format!("{},{}", key, extra)
    }
}

/// Wrap a canonical label body in braces, or nothing for the empty set.
fn braces(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", key)
    }
}

/// Integral values print without a trailing `.0` so counters read as
/// whole numbers, matching what scrapers expect.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_renders_empty_document() {
        assert_eq!(render(&MetricsSnapshot::default()), "");
    }

    #[test]
    fn integral_values_have_no_fraction() {
        assert_eq!(format_value(2.0), "2");
        assert_eq!(format_value(0.25), "0.25");
    }

    #[test]
    fn quantile_label_joins_existing_labels() {
        assert_eq!(
            join_labels("method=\"GET\"", "quantile=\"0.5\""),
            "method=\"GET\",quantile=\"0.5\""
        );
        assert_eq!(join_labels("", "quantile=\"0.5\""), "quantile=\"0.5\"");
    }
}
