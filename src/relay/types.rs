//! Request and response types exchanged with the relay.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// One user turn to relay upstream.
///
/// Wire form: `{ "message": .., "apiKey": .., "model": .. }`. The credential is
/// forwarded verbatim and never formatted by `Debug`.
#[derive(Clone, Debug, Deserialize)]
pub struct RelayRequest {
    /// Raw user text, sent as the only content of a single-turn exchange.
    #[serde(default)]
    pub message: String,
    /// Upstream credential.
    #[serde(rename = "apiKey", default = "empty_credential")]
    pub credential: SecretString,
    /// Upstream model identifier, passed through without validation.
    #[serde(rename = "model", default)]
    pub model_id: String,
}

fn empty_credential() -> SecretString {
    SecretString::new(String::new())
}

impl RelayRequest {
    /// Build a relay request.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        credential: SecretString,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            credential,
            model_id: model_id.into(),
        }
    }

    /// Borrowed wire representation, used when posting to a remote relay.
    pub(crate) fn to_wire(&self) -> WireRequest<'_> {
        WireRequest {
            message: &self.message,
            api_key: self.credential.expose_secret(),
            model: &self.model_id,
        }
    }
}

/// Serialized form of a [`RelayRequest`].
#[derive(Serialize)]
pub(crate) struct WireRequest<'a> {
    pub(crate) message: &'a str,
    #[serde(rename = "apiKey")]
    pub(crate) api_key: &'a str,
    pub(crate) model: &'a str,
}

/// Uniform outcome of one relayed turn.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelayResponse {
    /// The upstream produced assistant text.
    Ok {
        /// First textual content block of the reply.
        text: String,
    },
    /// The turn failed; the message is meant for the transcript.
    Err {
        /// Human-readable failure description.
        error_message: String,
    },
}

impl RelayResponse {
    /// Successful response carrying `text`.
    #[must_use]
    pub fn ok(text: impl Into<String>) -> Self {
        Self::Ok { text: text.into() }
    }

    /// Failed response carrying `error_message`.
    #[must_use]
    pub fn err(error_message: impl Into<String>) -> Self {
        Self::Err {
            error_message: error_message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_wire_names() {
        let raw = r#"{"message":"Hello","apiKey":"sk-test","model":"claude-3-haiku-20240307"}"#;
        let request: RelayRequest = serde_json::from_str(raw).unwrap_or_else(|_| {
            RelayRequest::new("", empty_credential(), "")
        });

        assert_eq!(request.message, "Hello");
        assert_eq!(request.credential.expose_secret(), "sk-test");
        assert_eq!(request.model_id, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: Option<RelayRequest> = serde_json::from_str(r#"{"message":"Hi"}"#).ok();
        let request = request.map(|r| (r.credential.expose_secret().is_empty(), r.model_id));
        assert_eq!(request, Some((true, String::new())));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let request = RelayRequest::new("Hi", SecretString::new("sk-secret".to_string()), "m");
        let debug = format!("{request:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("Hi"));
    }

    #[test]
    fn test_wire_form_exposes_camel_case_key() {
        let request = RelayRequest::new("Hi", SecretString::new("sk".to_string()), "m");
        let json = serde_json::to_value(request.to_wire()).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"message": "Hi", "apiKey": "sk", "model": "m"}));
    }
}
