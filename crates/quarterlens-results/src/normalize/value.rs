//! Coercion of raw JSON cells into numbers and labels

use chrono::DateTime;
use serde_json::Value;

const MISSING_MARKERS: [&str; 6] = ["", "-", "--", "None", "N/A", "null"];

/// Read a numeric cell
///
/// Accepts JSON numbers, numeric strings (thousands separators and a
/// trailing `%` are tolerated) and Yahoo-style `{"raw": n}` objects. Missing
/// markers and non-finite values yield `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        Value::Object(map) => map.get("raw").and_then(coerce_number),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn parse_numeric_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if MISSING_MARKERS
        .iter()
        .any(|m| trimmed.eq_ignore_ascii_case(m))
    {
        return None;
    }
    let cleaned: String = trimmed
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.trim().parse().ok()
}

/// Read a period cell as a label
///
/// Epoch timestamps (seconds or milliseconds) become ISO dates.
pub fn period_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => {
            if let Some(ts) = n.as_i64() {
                let datetime = if ts.abs() >= 100_000_000_000 {
                    DateTime::from_timestamp_millis(ts)
                } else if ts.abs() >= 100_000_000 {
                    DateTime::from_timestamp(ts, 0)
                } else {
                    None
                };
                if let Some(dt) = datetime {
                    return Some(dt.format("%Y-%m-%d").to_string());
                }
            }
            Some(n.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!(7)), Some(7.0));
        assert_eq!(coerce_number(&json!("1,234.5")), Some(1234.5));
        assert_eq!(coerce_number(&json!(" 18% ")), Some(18.0));
        assert_eq!(coerce_number(&json!({"raw": 3.2, "fmt": "3.20"})), Some(3.2));
        assert_eq!(coerce_number(&json!("-4.1")), Some(-4.1));
    }

    #[test]
    fn test_missing_markers() {
        for raw in ["", "-", "None", "N/A", "null", "abc"] {
            assert_eq!(coerce_number(&json!(raw)), None, "{raw}");
        }
        assert_eq!(coerce_number(&Value::Null), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
    }

    #[test]
    fn test_period_label() {
        assert_eq!(period_label(&json!(" Q1 2024 ")), Some("Q1 2024".into()));
        assert_eq!(period_label(&json!("")), None);
        assert_eq!(period_label(&json!(1_711_843_200_000_i64)), Some("2024-03-31".into()));
        assert_eq!(period_label(&json!(1_711_843_200_i64)), Some("2024-03-31".into()));
        assert_eq!(period_label(&json!(2024)), Some("2024".into()));
        assert_eq!(period_label(&Value::Null), None);
    }
}
