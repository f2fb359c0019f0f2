//! In-memory transport serving canned JSON documents.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::{AgentTransport, TransportError, TransportType};

/// Canned reply for a URL.
#[derive(Debug, Clone)]
enum CannedReply {
    Json(Value),
    Status(u16),
}

/// Transport that answers from a URL-keyed table instead of the network.
///
/// GET and POST share the table. Every POST body is recorded so callers can
/// inspect what would have been sent.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    routes: RwLock<HashMap<String, CannedReply>>,
    sent: RwLock<Vec<(String, Value)>>,
}

impl InMemoryTransport {
    /// Create an empty transport; every URL is unrouted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with the given JSON document.
    pub fn respond_json(&self, url: impl Into<String>, body: Value) {
        self.routes.write().insert(url.into(), CannedReply::Json(body));
    }

    /// Answer `url` with a non-success HTTP status.
    pub fn respond_status(&self, url: impl Into<String>, status: u16) {
        self.routes.write().insert(url.into(), CannedReply::Status(status));
    }

    /// All POST bodies sent so far, oldest first.
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.read().clone()
    }

    fn reply(&self, url: &str) -> Result<Value, TransportError> {
        match self.routes.read().get(url) {
            Some(CannedReply::Json(body)) => Ok(body.clone()),
            Some(CannedReply::Status(status)) => Err(TransportError::Status {
                url: url.to_string(),
                status: *status,
                body: String::new(),
            }),
            None => Err(TransportError::Unrouted { url: url.to_string() }),
        }
    }
}

#[async_trait]
impl AgentTransport for InMemoryTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::InMemory
    }

    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.reply(url)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.sent.write().push((url.to_string(), body.clone()));
        self.reply(url)
    }
}
