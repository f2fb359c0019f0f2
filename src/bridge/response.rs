//! Uniform result envelope shared by administrative tools and synthesized
//! capability endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::a2a::ClientError;

/// One text segment of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Result of any tool call: text segments plus an error flag.
///
/// Failures are reported in-band with `is_error` set; a tool never fails
/// across the front-end boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub content: Vec<TextContent>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResponse {
    /// A successful result with a single text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::new(text)],
            is_error: false,
        }
    }

    /// A failed result with a single text segment.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::new(text)],
            is_error: true,
        }
    }

    /// Pretty-printed JSON as a successful result.
    pub fn json(value: &impl Serialize) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => Self::error(format!("Failed to serialize result: {}", e)),
        }
    }

    /// Text of the first segment, or `""`.
    pub fn first_text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// Tool metadata as advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Message for a failed call to agent `agent_id`.
///
/// A JSON-RPC error from the agent is passed through verbatim; transport
/// failures name the agent and the failure class.
pub fn describe_client_error(agent_id: &str, err: &ClientError) -> String {
    match err {
        ClientError::Remote(remote) => remote.display_message(),
        ClientError::Transport(transport) => format!(
            "Failed to reach agent '{}' ({}): {}",
            agent_id,
            transport.code(),
            transport
        ),
    }
}

/// Message for an id that is not in the registry.
pub fn agent_not_found(agent_id: &str) -> String {
    format!("Agent '{}' not found", agent_id)
}
