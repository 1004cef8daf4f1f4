//! Failure body handling
//!
//! The workflow server reports failures as `{"detail": ...}`. A string detail
//! is shown verbatim; structured details (validation errors) are shown as
//! their JSON text. Missing or falsy details mean "no message", and callers
//! fall back to their own generic text.

use serde_json::Value;

/// Extract a human-readable message from a failure body
///
/// # Example
///
/// ```rust,ignore
/// let message = detail_message(&body).unwrap_or_else(|| "Generation failed".to_string());
/// ```
pub fn detail_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let detail = value.get("detail")?;

    match detail {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail_is_verbatim() {
        assert_eq!(
            detail_message(br#"{"detail": "rate limited"}"#),
            Some("rate limited".to_string())
        );
    }

    #[test]
    fn test_missing_detail() {
        assert_eq!(detail_message(br#"{"error": "boom"}"#), None);
        assert_eq!(detail_message(br#"{}"#), None);
    }

    #[test]
    fn test_falsy_details_fall_back() {
        assert_eq!(detail_message(br#"{"detail": ""}"#), None);
        assert_eq!(detail_message(br#"{"detail": null}"#), None);
        assert_eq!(detail_message(br#"{"detail": false}"#), None);
        assert_eq!(detail_message(br#"{"detail": 0}"#), None);
    }

    #[test]
    fn test_structured_detail_is_json_text() {
        let body = br#"{"detail": [{"loc": ["body", "user_intent"], "msg": "field required"}]}"#;
        let message = detail_message(body).unwrap();
        assert!(message.contains("field required"));
        assert!(message.starts_with('['));
    }

    #[test]
    fn test_non_json_body() {
        assert_eq!(detail_message(b"<html>502 Bad Gateway</html>"), None);
        assert_eq!(detail_message(b""), None);
    }
}
