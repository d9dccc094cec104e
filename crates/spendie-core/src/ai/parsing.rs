//! JSON parsing helpers for inference responses
//!
//! Models often wrap the JSON payload in prose or code fences, and field
//! types drift ("1200", 1200.0, "₹1,200"). These helpers locate the object and
//! coerce fields leniently; callers still decide what is required.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

const RAW_PREVIEW_CHARS: usize = 200;

/// Truncate long responses for error messages (char-boundary safe)
fn preview(raw: &str) -> String {
    if raw.chars().count() > RAW_PREVIEW_CHARS {
        let cut: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        raw.to_string()
    }
}

/// Slice out the outermost JSON object (first `{` to last `}`)
pub fn extract_json_object(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::UnparseableOutput(format!(
            "No JSON found in response | Raw: {}",
            preview(response)
        ))),
    }
}

/// Parse the JSON object embedded in a response into `T`
pub fn parse_json<T: DeserializeOwned>(response: &str) -> Result<T> {
    let json_str = extract_json_object(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        Error::UnparseableOutput(format!("Invalid JSON: {} | Raw: {}", e, preview(json_str)))
    })
}

/// Coerce a JSON value into trimmed, non-empty text
///
/// Placeholder strings models emit for missing values count as absent.
pub fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    match text.to_lowercase().as_str() {
        "" | "null" | "none" | "n/a" | "unknown" => None,
        _ => Some(text),
    }
}

/// Outcome of reading an amount field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    Missing,
    /// Whole currency units; fractional parts are truncated
    Value(i64),
    /// Present but not numeric
    Malformed,
}

impl AmountField {
    pub fn value(self) -> Option<i64> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Read an amount that may arrive as integer, float or decorated string
pub fn as_amount(value: &Value) -> AmountField {
    match value {
        Value::Null => AmountField::Missing,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .map_or(AmountField::Malformed, AmountField::Value),
        Value::String(s) => parse_amount_text(s),
        _ => AmountField::Malformed,
    }
}

/// Parse "₹1,200.50", "Rs. 300", "450/-" style text into whole units
pub fn parse_amount_text(text: &str) -> AmountField {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() || lowered == "null" || lowered == "none" {
        return AmountField::Missing;
    }
    let cleaned: String = lowered
        .trim_start_matches('₹')
        .trim_start_matches("inr")
        .trim_start_matches("rs.")
        .trim_start_matches("rs")
        .trim_end_matches("/-")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if let Ok(v) = cleaned.parse::<i64>() {
        return AmountField::Value(v);
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() => AmountField::Value(f.trunc() as i64),
        _ => AmountField::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(serde::Deserialize)]
    struct Probe {
        intent: String,
    }

    #[test]
    fn test_parse_json_with_surrounding_prose() {
        let raw = "Sure! Here it is:\n```json\n{\"intent\": \"total\"}\n```";
        let probe: Probe = parse_json(raw).unwrap();
        assert_eq!(probe.intent, "total");
    }

    #[test]
    fn test_parse_json_without_object_is_unparseable() {
        match parse_json::<Probe>("I cannot help with that") {
            Err(Error::UnparseableOutput(msg)) => assert!(msg.contains("No JSON found")),
            other => panic!("expected UnparseableOutput, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_parse_json_wrong_shape_is_unparseable() {
        assert!(matches!(
            parse_json::<Probe>("{\"type\": \"income\"}"),
            Err(Error::UnparseableOutput(_))
        ));
    }

    #[test]
    fn test_long_raw_preview_is_truncated_on_char_boundary() {
        let raw = "₹".repeat(500);
        match extract_json_object(&raw) {
            Err(Error::UnparseableOutput(msg)) => assert!(msg.ends_with("...")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_as_text() {
        assert_eq!(as_text(&json!(" papa ")), Some("papa".to_string()));
        assert_eq!(as_text(&json!("null")), None);
        assert_eq!(as_text(&json!("")), None);
        assert_eq!(as_text(&Value::Null), None);
        assert_eq!(as_text(&json!(42)), Some("42".to_string()));
    }

    #[test]
    fn test_as_amount() {
        assert_eq!(as_amount(&json!(1200)), AmountField::Value(1200));
        assert_eq!(as_amount(&json!(99.99)), AmountField::Value(99));
        assert_eq!(as_amount(&json!("₹1,200.50")), AmountField::Value(1200));
        assert_eq!(as_amount(&json!("Rs. 300")), AmountField::Value(300));
        assert_eq!(as_amount(&json!("450/-")), AmountField::Value(450));
        assert_eq!(as_amount(&json!("-20")), AmountField::Value(-20));
        assert_eq!(as_amount(&json!("twelve")), AmountField::Malformed);
        assert_eq!(as_amount(&json!([1])), AmountField::Malformed);
        assert_eq!(as_amount(&Value::Null), AmountField::Missing);
        assert_eq!(as_amount(&json!("")), AmountField::Missing);
    }
}
