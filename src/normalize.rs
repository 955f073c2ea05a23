//! Normalization of the usage export.
//!
//! The usage endpoint answers with human-readable keys such as
//! `"Queries Today"` and numbers encoded as strings. This pass rewrites the
//! top level of that object into `snake_case` keys with integer values.
//! Nested objects and arrays are left alone.

use serde_json::{Map, Value};

use crate::models::UsageRecord;

/// Normalizes a decoded usage response.
///
/// Objects go through [`normalize_record`]; any other JSON value is
/// returned unchanged.
pub fn normalize_usage(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_record(map)),
        other => other,
    }
}

/// Rewrites every top-level key with [`normalize_key`] and converts values
/// that [`coerce_integer`] accepts into integers.
///
/// If two keys normalize to the same name, the one visited last wins.
pub fn normalize_record(map: Map<String, Value>) -> UsageRecord {
    map.into_iter()
        .map(|(key, value)| {
            let value = match coerce_integer(&value) {
                Some(n) => Value::from(n),
                None => value,
            };
            (normalize_key(&key), value)
        })
        .collect()
}

/// `"Plan Tier"` becomes `"plan_tier"`.
pub fn normalize_key(key: &str) -> String {
    key.replace(' ', "_").to_lowercase()
}

/// Reads a JSON scalar as an integer, truncating any fractional part.
///
/// Numbers are accepted directly. Strings are trimmed and must then be a
/// plain decimal literal (optional sign, digits, optional fraction,
/// optional exponent). Blank strings, `NaN`, `Infinity`, hex and
/// thousands-separated forms are rejected, as are values outside the `i64`
/// range. Booleans, null, arrays and objects always yield `None`.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64().and_then(truncate_f64)
            }
        }
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<i64> {
    if !is_decimal_literal(s) {
        return None;
    }
    // Plain integers are parsed exactly; f64 would lose precision past 2^53.
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    s.parse::<f64>().ok().and_then(truncate_f64)
}

fn truncate_f64(f: f64) -> Option<i64> {
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

/// `[+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn usage_keys_and_values_are_normalized() {
        let raw = json!({"Queries Today": "42", "Plan Tier": "Pro"});
        assert_eq!(
            normalize_usage(raw),
            json!({"queries_today": 42, "plan_tier": "Pro"})
        );
    }

    #[test]
    fn every_space_is_replaced() {
        assert_eq!(normalize_key("Daily  Query Limit"), "daily__query_limit");
        assert_eq!(normalize_key("already_snake"), "already_snake");
        assert_eq!(normalize_key("BURST Tokens"), "burst_tokens");
    }

    #[test]
    fn numeric_strings_are_truncated() {
        assert_eq!(coerce_integer(&json!(" 17 ")), Some(17));
        assert_eq!(coerce_integer(&json!("3.99")), Some(3));
        assert_eq!(coerce_integer(&json!("-3.99")), Some(-3));
        assert_eq!(coerce_integer(&json!("1e3")), Some(1000));
        assert_eq!(coerce_integer(&json!(".5")), Some(0));
        assert_eq!(coerce_integer(&json!("+8.")), Some(8));
        assert_eq!(
            coerce_integer(&json!("9007199254740993")),
            Some(9_007_199_254_740_993)
        );
    }

    #[test]
    fn json_numbers_are_truncated() {
        assert_eq!(coerce_integer(&json!(12)), Some(12));
        assert_eq!(coerce_integer(&json!(12.7)), Some(12));
        assert_eq!(coerce_integer(&json!(u64::MAX)), None);
    }

    #[test]
    fn non_numeric_values_are_left_alone() {
        for value in [
            json!(""),
            json!("   "),
            json!("NaN"),
            json!("Infinity"),
            json!("0x1A"),
            json!("1,000"),
            json!("12 queries"),
            json!("1e"),
            json!("."),
            json!("1e400"),
            json!(true),
            json!(null),
            json!([1]),
            json!({"a": 1}),
        ] {
            assert_eq!(coerce_integer(&value), None, "{value}");
        }
    }

    #[test]
    fn nested_values_are_not_recursed() {
        let raw = json!({
            "Total": "10",
            "Per Day": {"Monday Count": "4"},
            "History": ["1", "2"],
        });
        let normalized = normalize_usage(raw);
        assert_eq!(normalized["total"], json!(10));
        assert_eq!(normalized["per_day"], json!({"Monday Count": "4"}));
        assert_eq!(normalized["history"], json!(["1", "2"]));
    }

    #[test]
    fn non_object_passes_through() {
        assert_eq!(normalize_usage(json!(["x"])), json!(["x"]));
        assert_eq!(normalize_usage(json!("denied")), json!("denied"));
    }
}
