//! HTTP transport for remote A2A agents.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{AgentTransport, TransportError, TransportType};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    /// Per-request timeout in seconds.
    pub timeout: u64,
}

impl HttpTransport {
    /// Create a new HttpTransport.
    ///
    /// # Arguments
    /// * `timeout` - Per-request timeout in seconds.
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialized.
    pub fn new(timeout: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client, timeout })
    }

    async fn read_json(url: &str, resp: reqwest::Response) -> Result<Value, TransportError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|e| classify(url, e))
    }
}

/// Map a reqwest error onto the transport taxonomy.
fn classify(url: &str, err: reqwest::Error) -> TransportError {
    let url = url.to_string();
    if err.is_timeout() {
        TransportError::Timeout { url }
    } else if err.is_connect() {
        TransportError::Connect { url, message: err.to_string() }
    } else if err.is_decode() {
        TransportError::Decode { url, message: err.to_string() }
    } else if let Some(status) = err.status() {
        TransportError::Status { url, status: status.as_u16(), body: String::new() }
    } else {
        TransportError::Request { url, message: err.to_string() }
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Http
    }

    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        log::debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| classify(url, e))?;
        Self::read_json(url, resp).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        log::debug!("POST {}", url);
        let resp = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| classify(url, e))?;
        Self::read_json(url, resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::{get, post}, Json, Router};
    use serde_json::json;

    /// Serve a fake agent on an ephemeral port and return its base URL.
    async fn spawn_fake_agent() -> String {
        let app = Router::new()
            .route(
                "/agent/.well-known/agent.json",
                get(|| async { Json(json!({"name": "Fake", "url": "x", "version": "1"})) }),
            )
            .route(
                "/rpc",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"jsonrpc": "2.0", "id": body["id"], "result": {"echo": body["params"]}}))
                }),
            )
            .route("/broken", get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }))
            .route("/html", get(|| async { "<html></html>" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_get_and_post_json() {
        let base = spawn_fake_agent().await;
        let transport = HttpTransport::new(5).unwrap();
        assert_eq!(transport.transport_type(), TransportType::Http);

        let card = transport
            .get_json(&format!("{}/agent/.well-known/agent.json", base))
            .await
            .unwrap();
        assert_eq!(card["name"], "Fake");

        let resp = transport
            .post_json(&format!("{}/rpc", base), &json!({"id": "c1", "params": {"a": 1}}))
            .await
            .unwrap();
        assert_eq!(resp["id"], "c1");
        assert_eq!(resp["result"]["echo"]["a"], 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_classified() {
        let base = spawn_fake_agent().await;
        let transport = HttpTransport::new(5).unwrap();
        let err = transport
            .get_json(&format!("{}/broken", base))
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, body, .. } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let base = spawn_fake_agent().await;
        let transport = HttpTransport::new(5).unwrap();
        let err = transport
            .get_json(&format!("{}/html", base))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "decode");
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        // Bind and drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(5).unwrap();
        let err = transport
            .get_json(&format!("http://{}/x", addr))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "connect");
    }
}
