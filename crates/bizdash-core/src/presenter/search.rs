// ── Page-local search ──
//
// Case-insensitive substring match over every field value of every record
// on the currently loaded page. Never re-queries the server.

use std::sync::Arc;

use serde_json::Value;

use crate::model::Record;

/// Filter `records` by `text`. An empty `text` returns the page unchanged.
///
/// Pure: the result depends only on `(records, text)`.
pub fn filter_records(records: &[Arc<Record>], text: &str) -> Vec<Arc<Record>> {
    if text.is_empty() {
        return records.to_vec();
    }
    let needle = text.to_lowercase();
    records
        .iter()
        .filter(|record| record.values().any(|v| value_matches(v, &needle)))
        .cloned()
        .collect()
}

/// Null, `false`, zero and empty strings never match.
fn value_matches(value: &Value, needle: &str) -> bool {
    let text = match value {
        Value::Null | Value::Bool(false) => return false,
        Value::Number(n) if n.as_f64() == Some(0.0) => return false,
        Value::String(s) if s.is_empty() => return false,
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    };
    text.contains(needle)
}
