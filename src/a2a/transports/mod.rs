//! Transport layer for reaching remote A2A agents.
//!
//! All transports implement the `AgentTransport` trait: a JSON GET for agent
//! cards and a JSON POST for JSON-RPC calls. Framing beyond "a JSON document
//! in, a JSON document out" is the transport's business.
//!
//! - **HTTP** (`HttpTransport`): talks to real agents with `reqwest`.
//! - **In-memory** (`InMemoryTransport`): serves canned documents keyed by
//!   URL, for tests and offline runs.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpTransport;
pub use memory::InMemoryTransport;

// ---------------------------------------------------------------------------
// TransportType
// ---------------------------------------------------------------------------

/// Agent transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    /// HTTP(S) via reqwest.
    Http,
    /// Canned in-process responses.
    InMemory,
}

impl std::fmt::Display for TransportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportType::Http => write!(f, "http"),
            TransportType::InMemory => write!(f, "in-memory"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// Failure to obtain a JSON document from a remote agent.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The agent answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16, body: String },

    /// The connection could not be established.
    #[error("connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    /// The request did not complete in time.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The response body was not the expected JSON.
    #[error("invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Any other failure while building or sending the request.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// No canned response is configured for this URL.
    #[error("no response configured for {url}")]
    Unrouted { url: String },
}

impl TransportError {
    /// Short classification code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Connect { .. } => "connect",
            Self::Timeout { .. } => "timeout",
            Self::Decode { .. } => "decode",
            Self::Request { .. } => "request",
            Self::Unrouted { .. } => "unrouted",
        }
    }
}

// ---------------------------------------------------------------------------
// AgentTransport
// ---------------------------------------------------------------------------

/// Trait for agent transport implementations.
///
/// Implementations must be cheap to share behind an `Arc` and must not hold
/// state between calls beyond connection pooling.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Return the transport type.
    fn transport_type(&self) -> TransportType;

    /// Fetch a JSON document with GET.
    ///
    /// # Errors
    ///
    /// * Non-success status, connection failure, timeout, or a body that is
    ///   not JSON.
    async fn get_json(&self, url: &str) -> Result<Value, TransportError>;

    /// POST a JSON document and return the JSON response body.
    ///
    /// # Errors
    ///
    /// Same classes as [`AgentTransport::get_json`].
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}
