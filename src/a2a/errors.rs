//! A2A error codes and the JSON-RPC error object.
//!
//! Error codes follow JSON-RPC 2.0 conventions:
//! - -32700 to -32600: Standard JSON-RPC errors
//! - -32099 to -32000: Server errors (A2A-specific)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A2A protocol error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum A2AErrorCode {
    // JSON-RPC 2.0 Standard Errors
    /// Invalid JSON was received by the server.
    JsonParseError = -32700,
    /// The JSON sent is not a valid Request object.
    InvalidRequest = -32600,
    /// The method does not exist / is not available.
    MethodNotFound = -32601,
    /// Invalid method parameter(s).
    InvalidParams = -32602,
    /// Internal JSON-RPC error.
    InternalError = -32603,

    // A2A-Specific Errors
    /// The specified task was not found.
    TaskNotFound = -32001,
    /// The task cannot be canceled.
    TaskNotCancelable = -32002,
    /// Push notifications are not supported.
    PushNotificationNotSupported = -32003,
    /// The requested operation is not supported.
    UnsupportedOperation = -32004,
    /// Incompatible content types.
    ContentTypeNotSupported = -32005,
    /// The agent produced an invalid response.
    InvalidAgentResponse = -32006,
}

impl A2AErrorCode {
    /// Look up a known code.
    pub fn from_code(code: i32) -> Option<Self> {
        let known = match code {
            -32700 => Self::JsonParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32001 => Self::TaskNotFound,
            -32002 => Self::TaskNotCancelable,
            -32003 => Self::PushNotificationNotSupported,
            -32004 => Self::UnsupportedOperation,
            -32005 => Self::ContentTypeNotSupported,
            -32006 => Self::InvalidAgentResponse,
            _ => return None,
        };
        Some(known)
    }

    /// Get the default error message for this code.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::JsonParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::TaskNotFound => "Task not found",
            Self::TaskNotCancelable => "Task not cancelable",
            Self::PushNotificationNotSupported => "Push Notification is not supported",
            Self::UnsupportedOperation => "This operation is not supported",
            Self::ContentTypeNotSupported => "Incompatible content types",
            Self::InvalidAgentResponse => "Invalid agent response",
        }
    }
}

/// JSON-RPC error object, as sent by remote agents and by the MCP front end.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct A2AError {
    /// The A2A/JSON-RPC error code.
    #[serde(default)]
    pub code: i32,
    /// Human-readable error message.
    #[serde(default)]
    pub message: String,
    /// Optional additional error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl A2AError {
    /// Create a new `A2AError` from an error code with default message.
    pub fn from_code(code: A2AErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Create a new `A2AError` with a custom message.
    pub fn new(code: A2AErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
        }
    }

    /// The message to show a human.
    ///
    /// The remote message verbatim when present; otherwise the default text
    /// for a known code, or a generic line naming the code.
    pub fn display_message(&self) -> String {
        if !self.message.trim().is_empty() {
            return self.message.clone();
        }
        A2AErrorCode::from_code(self.code)
            .map(|c| c.default_message().to_string())
            .unwrap_or_else(|| format!("Remote error {}", self.code))
    }

    /// Convert to full JSON-RPC error response.
    pub fn to_response(&self, request_id: Option<Value>) -> Value {
        serde_json::json!({
            "jsonrpc": super::types::JSONRPC_VERSION,
            "error": self,
            "id": request_id.unwrap_or(Value::Null),
        })
    }
}
