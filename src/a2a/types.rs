//! Type definitions for the A2A protocol: agent cards, messages and the
//! JSON-RPC envelope used for `tasks/send`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::A2AError;

/// JSON-RPC protocol version tag.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method used to hand a task to a remote agent.
pub const SEND_TASK_METHOD: &str = "tasks/send";

/// Well-known path of an agent card, relative to the registration URL.
pub const AGENT_CARD_PATH: &str = ".well-known/agent.json";

/// Build the agent card URL for a registration URL.
///
/// A trailing slash is normalized onto the base before the well-known path
/// is appended, so `https://x/agent` and `https://x/agent/` resolve the same.
pub fn agent_card_url(registration_url: &str) -> String {
    format!("{}/{}", registration_url.trim_end_matches('/'), AGENT_CARD_PATH)
}

// ---------------------------------------------------------------------------
// Agent card types
// ---------------------------------------------------------------------------

/// Describes a skill (capability) that an A2A agent offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSkill {
    /// Unique identifier for the skill.
    pub id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description of what the skill does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Any other fields the agent advertised, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Agent card describing a remote A2A agent.
///
/// The required fields are strongly typed; unknown fields land in `extra`
/// and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCard {
    /// Identifier the agent suggests for itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Agent name.
    pub name: String,
    /// Agent description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Endpoint that accepts JSON-RPC task requests.
    pub url: String,
    /// Agent version.
    pub version: String,
    /// Advertised protocol capabilities (streaming, push notifications, ...).
    pub capabilities: Value,
    /// Invocable skills, in advertised order.
    pub skills: Vec<AgentSkill>,
    /// Any other fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

/// A single part of an A2A message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Part kind; only `"text"` is produced by the bridge.
    #[serde(rename = "type")]
    pub kind: String,
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
        }
    }
}

/// A message in the A2A protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2AMessage {
    /// Role of the sender (`"user"` or `"agent"`).
    pub role: String,
    /// Message parts.
    pub parts: Vec<Part>,
}

impl A2AMessage {
    /// A user message carrying a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC envelope
// ---------------------------------------------------------------------------

/// Parameters of a `tasks/send` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSendParams {
    /// Task identifier.
    pub id: String,
    /// Message handed to the agent.
    pub message: A2AMessage,
    /// Routing metadata (e.g. the target skill).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Outbound JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest<P = Value> {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Correlation identifier.
    pub id: String,
    /// Method name.
    pub method: String,
    /// Method parameters.
    pub params: P,
}

impl<P> JsonRpcRequest<P> {
    /// Create a request with the given correlation id.
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// Inbound JSON-RPC response; exactly one of `result`/`error` is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version echoed by the agent.
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Correlation identifier echoed by the agent.
    #[serde(default)]
    pub id: Option<Value>,
    /// Successful result payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<A2AError>,
}

/// Extract the reply text from a task result.
///
/// Looks at the status message first, then at the first artifact. Returns
/// `None` if neither carries a text part.
pub fn extract_reply_text(result: &Value) -> Option<String> {
    let first_text = |parts: Option<&Value>| {
        parts
            .and_then(|p| p.as_array())
            .and_then(|arr| {
                arr.iter()
                    .find_map(|part| part.get("text").and_then(|t| t.as_str()))
            })
            .map(|s| s.to_string())
    };

    first_text(
        result
            .get("status")
            .and_then(|s| s.get("message"))
            .and_then(|m| m.get("parts")),
    )
    .or_else(|| {
        first_text(
            result
                .get("artifacts")
                .and_then(|a| a.as_array())
                .and_then(|arr| arr.first())
                .and_then(|a| a.get("parts")),
        )
    })
}
