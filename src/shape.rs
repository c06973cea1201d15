//! Field-shaping helpers shared by the resource planners: the handful of
//! conversions between the loosely-typed item parameters and the exact
//! shapes the Firefly III API expects.

use serde_json::{Map, Value};

/// Splits a comma-separated ID list, trimming each element. Empty tokens
/// from doubled or trailing commas are preserved; whether the API accepts
/// them is left to the server.
pub(crate) fn comma_separated(value: &str) -> Vec<String> {
    value.split(',').map(|part| part.trim().to_string()).collect()
}

/// Parses every present, non-empty filter into a trimmed ID array. Absent
/// filters produce no entry at all, never an empty array.
pub(crate) fn parse_comma_separated_fields(
    fields: &[(&str, &Option<String>)],
) -> Vec<(String, Vec<String>)> {
    let mut parsed = vec![];

    for (key, value) in fields {
        if let Some(value) = value {
            if !value.is_empty() {
                parsed.push((key.to_string(), comma_separated(value)));
            }
        }
    }

    parsed
}

/// Rewrites a numeric entry to its decimal-string form. Monetary amounts
/// are collected as numbers but the API wants them as strings.
pub(crate) fn amount_to_string(fields: &mut Map<String, Value>, key: &str) {
    if let Some(Value::Number(amount)) = fields.get(key) {
        let amount = amount.to_string();
        fields.insert(key.to_string(), Value::String(amount));
    }
}

/// Maps the "all" sentinel to an omitted transaction-type filter.
pub(crate) fn transaction_type_filter(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "all")
}

/// Converts a non-empty comma-separated `tags` entry into an array, the
/// shape the API expects inside a transaction split.
pub(crate) fn split_tags_entry(fields: &mut Map<String, Value>) {
    let tags = match fields.get("tags") {
        Some(Value::String(tags)) if !tags.is_empty() => tags,
        _ => return,
    };

    let parsed = comma_separated(tags).into_iter().map(Value::String).collect();
    fields.insert("tags".to_string(), Value::Array(parsed));
}

/// Truthiness used when pruning optional keys out of repeatable group
/// entries: null, false, zero, and the empty string all drop the key.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
