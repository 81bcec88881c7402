//! How a controller reaches the relay.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::relay::normalize::{UNEXPECTED_FORMAT, extract_relay_error, extract_text};
use crate::relay::{Relay, RelayRequest, RelayResponse};

use super::error::TransportError;

/// Boxed future type for relay transports.
pub type RelayFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A way of delivering one relay request and reading back its outcome.
pub trait RelayTransport: Send + Sync {
    /// Deliver `request` and normalize the reply.
    ///
    /// # Errors
    /// Returns an error if the call itself cannot be completed.
    fn relay<'a>(
        &'a self,
        request: &'a RelayRequest,
    ) -> RelayFuture<'a, Result<RelayResponse, TransportError>>;
}

/// In-process relay: no network hop between controller and relay.
impl RelayTransport for Relay {
    fn relay<'a>(
        &'a self,
        request: &'a RelayRequest,
    ) -> RelayFuture<'a, Result<RelayResponse, TransportError>> {
        Box::pin(async move { Ok(self.forward(request).await) })
    }
}

/// Posts requests to a relay served over HTTP.
pub struct HttpRelayTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpRelayTransport {
    /// Create a transport for the relay at `endpoint` (e.g. `http://host:3000/api/chat`).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: Url) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| TransportError::HttpClient(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    async fn post(&self, request: &RelayRequest) -> Result<RelayResponse, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request.to_wire())
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;

        if !status.is_success() {
            tracing::debug!(%status, "Relay returned failure envelope");
            return Ok(RelayResponse::err(extract_relay_error(&body)));
        }

        Ok(extract_text(&body).map_or_else(|| RelayResponse::err(UNEXPECTED_FORMAT), RelayResponse::ok))
    }
}

impl RelayTransport for HttpRelayTransport {
    fn relay<'a>(
        &'a self,
        request: &'a RelayRequest,
    ) -> RelayFuture<'a, Result<RelayResponse, TransportError>> {
        Box::pin(self.post(request))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use secrecy::SecretString;

    use super::*;
    use crate::relay::tests::unreachable_url;

    async fn spawn_relay_stub(status: StatusCode, body: &'static str) -> Url {
        let app = Router::new().route("/api/chat", post(move || async move { (status, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Url::parse(&format!("http://{addr}/api/chat")).unwrap()
    }

    fn request() -> RelayRequest {
        RelayRequest::new("Hello", SecretString::new("sk".to_string()), "claude-3-sonnet-20240229")
    }

    async fn relay_via(status: StatusCode, body: &'static str) -> Result<RelayResponse, TransportError> {
        let transport = HttpRelayTransport::new(spawn_relay_stub(status, body).await).unwrap();
        transport.relay(&request()).await
    }

    #[tokio::test]
    async fn test_success_body() {
        let response = relay_via(StatusCode::OK, r#"{"content":[{"text":"Hi there"}]}"#).await;
        assert_eq!(response.ok(), Some(RelayResponse::ok("Hi there")));
    }

    #[tokio::test]
    async fn test_failure_envelope() {
        let response = relay_via(StatusCode::UNAUTHORIZED, r#"{"error":"invalid x-api-key"}"#).await;
        assert_eq!(response.ok(), Some(RelayResponse::err("invalid x-api-key")));
    }

    #[tokio::test]
    async fn test_failure_envelope_without_message() {
        let response = relay_via(StatusCode::BAD_GATEWAY, "{}").await;
        assert_eq!(
            response.ok(),
            Some(RelayResponse::err("Failed to get response from Claude"))
        );
    }

    #[tokio::test]
    async fn test_success_without_content() {
        let response = relay_via(StatusCode::OK, "{}").await;
        assert_eq!(response.ok(), Some(RelayResponse::err(UNEXPECTED_FORMAT)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_transport_error() {
        let response = relay_via(StatusCode::OK, "not json").await;
        assert!(matches!(response, Err(TransportError::JsonParse(_))));
    }

    #[tokio::test]
    async fn test_failure_with_non_json_body_is_transport_error() {
        let response = relay_via(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").await;
        assert!(matches!(response, Err(TransportError::JsonParse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_transport_error() {
        let endpoint = Url::parse(&unreachable_url().await).unwrap();
        let transport = HttpRelayTransport::new(endpoint).unwrap();

        let response = transport.relay(&request()).await;

        assert!(matches!(response, Err(TransportError::HttpRequest(_))));
    }

    #[tokio::test]
    async fn test_posts_wire_request() {
        let seen: Arc<tokio::sync::Mutex<Option<Value>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let app = Router::new().route(
            "/api/chat",
            post(move |axum::Json(body): axum::Json<Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    *sink.lock().await = Some(body);
                    axum::Json(serde_json::json!({"content": [{"text": "ok"}]}))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let endpoint = Url::parse(&format!("http://{addr}/api/chat")).unwrap();
        let transport = HttpRelayTransport::new(endpoint).unwrap();
        let response = transport.relay(&request()).await;

        assert_eq!(response.ok(), Some(RelayResponse::ok("ok")));
        assert_eq!(
            seen.lock().await.clone(),
            Some(serde_json::json!({
                "message": "Hello",
                "apiKey": "sk",
                "model": "claude-3-sonnet-20240229"
            }))
        );
    }
}
