//! Mapping of upstream bodies onto the uniform relay outcome.
//!
//! Both hops use these helpers: the relay when it normalizes an upstream reply,
//! and the HTTP transport when it reads the relay's mirrored success body.

use serde_json::Value;

/// Fallback when a failure body carries no readable message.
pub const UPSTREAM_FAILURE_FALLBACK: &str = "Failed to get response from Claude";

/// Reported when a success body lacks the expected content shape.
pub const UNEXPECTED_FORMAT: &str = "Unexpected response format from Claude";

/// Reported for any fault inside the relay.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Extract the first textual content block of a completion body.
///
/// Expects `{"content": [{"text": "..."}, ...]}`. An empty text counts as absent.
#[must_use]
pub fn extract_text(body: &Value) -> Option<String> {
    body.get("content")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Extract `error.message` from an upstream failure body.
#[must_use]
pub fn extract_error_message(body: &Value) -> String {
    body.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map_or_else(|| UPSTREAM_FAILURE_FALLBACK.to_string(), str::to_string)
}

/// Extract the flat `error` field of a relay failure envelope.
#[must_use]
pub fn extract_relay_error(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map_or_else(|| UPSTREAM_FAILURE_FALLBACK.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_first_text_block() {
        let body = json!({
            "id": "msg_01",
            "content": [{"type": "text", "text": "Hi there"}, {"type": "text", "text": "ignored"}],
        });
        assert_eq!(extract_text(&body).as_deref(), Some("Hi there"));
    }

    #[test]
    fn test_extract_text_rejects_missing_or_malformed_content() {
        assert_eq!(extract_text(&json!({})), None);
        assert_eq!(extract_text(&json!({"content": []})), None);
        assert_eq!(extract_text(&json!({"content": "text"})), None);
        assert_eq!(extract_text(&json!({"content": [{"type": "tool_use"}]})), None);
        assert_eq!(extract_text(&json!({"content": [{"text": 42}]})), None);
        assert_eq!(extract_text(&json!({"content": [{"text": ""}]})), None);
    }

    #[test]
    fn test_extract_text_keeps_whitespace() {
        let body = json!({"content": [{"text": "  line one\n\tline two  "}]});
        assert_eq!(extract_text(&body).as_deref(), Some("  line one\n\tline two  "));
    }

    #[test]
    fn test_extract_error_message() {
        let body = json!({"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}});
        assert_eq!(extract_error_message(&body), "invalid x-api-key");
        assert_eq!(extract_error_message(&json!({"error": "flat"})), UPSTREAM_FAILURE_FALLBACK);
        assert_eq!(extract_error_message(&json!(null)), UPSTREAM_FAILURE_FALLBACK);
    }

    #[test]
    fn test_extract_relay_error() {
        assert_eq!(extract_relay_error(&json!({"error": "invalid x-api-key"})), "invalid x-api-key");
        assert_eq!(extract_relay_error(&json!({"detail": "nope"})), UPSTREAM_FAILURE_FALLBACK);
    }
}
