//! Label set canonicalization
//!
//! A labeled series is indexed by a canonical string key derived from the
//! label names in sorted order. `{method:"GET",status:"200"}` and
//! `{status:"200",method:"GET"}` must land in the same series, so the key
//! is built from a `BTreeMap` rather than insertion order.

use std::collections::BTreeMap;

/// Named dimensions that subdivide a metric into independent series.
pub type LabelSet = BTreeMap<String, String>;

/// Build a `LabelSet` from borrowed pairs.
pub fn label_set(pairs: &[(&str, &str)]) -> LabelSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Canonical lookup key for a label set: `k1="v1",k2="v2"` with keys in
/// sorted order and values escaped. The same string doubles as the label
/// body in the Prometheus exposition output.
pub fn canonical_key(labels: &LabelSet) -> String {
    let mut out = String::new();
    for (i, (key, value)) in labels.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_label_value(value));
        out.push('"');
    }
    out
}

/// Escape a label value per the Prometheus text exposition rules:
/// backslash, double quote, and line feed.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_insensitive() {
        let a = label_set(&[("method", "GET"), ("status", "200")]);
        let b = label_set(&[("status", "200"), ("method", "GET")]);
        assert_eq!(canonical_key(&a), canonical_key(&b));
        assert_eq!(canonical_key(&a), r#"method="GET",status="200""#);
    }

    #[test]
    fn empty_set_yields_empty_key() {
        assert_eq!(canonical_key(&LabelSet::new()), "");
    }

    #[test]
    fn values_are_escaped() {
        let labels = label_set(&[("path", "a\\b\"c\nd")]);
        assert_eq!(canonical_key(&labels), "path=\"a\\\\b\\\"c\\nd\"");
    }
}
