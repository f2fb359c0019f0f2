//! MCP JSON-RPC dispatcher.
//!
//! Maps `initialize`, `ping`, `tools/list` and `tools/call` onto the
//! [`BridgeFacade`]. Shared by the stdio loop and the HTTP `/mcp` route.

use serde_json::{json, Value};

use crate::a2a::types::JSONRPC_VERSION;
use crate::a2a::{A2AError, A2AErrorCode};
use crate::bridge::BridgeFacade;

/// MCP protocol revision announced by `initialize`.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Name announced in `serverInfo`.
pub const SERVER_NAME: &str = "a2a-mcp-bridge";

/// Answers MCP JSON-RPC requests.
#[derive(Debug, Clone)]
pub struct McpDispatcher {
    facade: BridgeFacade,
}

impl McpDispatcher {
    pub fn new(facade: BridgeFacade) -> Self {
        Self { facade }
    }

    pub fn facade(&self) -> &BridgeFacade {
        &self.facade
    }

    /// Handle one serialized message. Returns the serialized reply, if any.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let reply = match serde_json::from_str::<Value>(line) {
            Ok(request) => self.handle(request).await?,
            Err(e) => error_response(
                Value::Null,
                A2AErrorCode::JsonParseError,
                format!("Parse error: {}", e),
            ),
        };
        Some(reply.to_string())
    }

    /// Handle one decoded message.
    ///
    /// Notifications (no `id`, or any `notifications/*` method) are processed
    /// without a reply.
    pub async fn handle(&self, request: Value) -> Option<Value> {
        let Some(object) = request.as_object() else {
            return Some(error_response(
                Value::Null,
                A2AErrorCode::InvalidRequest,
                "Request must be a JSON object",
            ));
        };

        let id = object.get("id").cloned();
        let Some(method) = object.get("method").and_then(Value::as_str) else {
            return Some(error_response(
                id.unwrap_or(Value::Null),
                A2AErrorCode::InvalidRequest,
                "Missing method",
            ));
        };
        let params = object.get("params").cloned().unwrap_or_else(|| json!({}));

        if method.starts_with("notifications/") {
            log::debug!("Notification: {}", method);
            return None;
        }

        let outcome = match method {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({"tools": self.facade.tool_definitions()})),
            "tools/call" => self.tools_call(&params).await,
            _ => Err((
                A2AErrorCode::MethodNotFound,
                format!("Method not found: {}", method),
            )),
        };

        let id = match id {
            Some(id) => id,
            None => {
                log::debug!("Dropping reply to notification-style '{}'", method);
                return None;
            }
        };

        Some(match outcome {
            Ok(result) => json!({"jsonrpc": JSONRPC_VERSION, "id": id, "result": result}),
            Err((code, message)) => error_response(id, code, message),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {
                "name": SERVER_NAME,
                "version": crate::VERSION,
            },
        })
    }

    async fn tools_call(&self, params: &Value) -> Result<Value, (A2AErrorCode, String)> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or((A2AErrorCode::InvalidParams, "Missing tool name".to_string()))?;
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args @ Value::Object(_)) => args.clone(),
            Some(_) => {
                return Err((
                    A2AErrorCode::InvalidParams,
                    "Tool arguments must be an object".to_string(),
                ))
            }
        };

        let response = self.facade.call_tool(name, &arguments).await;
        serde_json::to_value(response)
            .map_err(|e| (A2AErrorCode::InternalError, e.to_string()))
    }
}

fn error_response(id: Value, code: A2AErrorCode, message: impl Into<String>) -> Value {
    A2AError::new(code, message).to_response(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::a2a::types::agent_card_url;
    use crate::a2a::{A2AClient, InMemoryTransport, MOCK_REPLY_TEXT};
    use crate::bridge::CapabilityBridge;
    use crate::registry::AgentRegistry;

    const REG_URL: &str = "https://example.test/agent";

    async fn dispatcher(dir: &std::path::Path) -> McpDispatcher {
        let transport = Arc::new(InMemoryTransport::new());
        transport.respond_json(
            agent_card_url(REG_URL),
            json!({
                "id": "bella",
                "name": "Bella",
                "url": "https://bella.test/rpc",
                "version": "1.0.0",
                "capabilities": {},
                "skills": [{"id": "special-of-day"}],
            }),
        );
        let client = A2AClient::new(transport, true);
        let registry = Arc::new(AgentRegistry::new(dir, client.clone()));
        registry.init().await.unwrap();
        let bridge = Arc::new(CapabilityBridge::new(registry, client));
        McpDispatcher::new(BridgeFacade::new(bridge))
    }

    #[tokio::test]
    async fn test_initialize_and_ping() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(dir.path()).await;

        let reply = dispatcher
            .handle(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}))
            .await
            .unwrap();
        assert_eq!(reply["id"], 1);
        assert_eq!(reply["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(reply["result"]["serverInfo"]["name"], SERVER_NAME);

        let reply = dispatcher
            .handle(json!({"jsonrpc": "2.0", "id": "p", "method": "ping"}))
            .await
            .unwrap();
        assert_eq!(reply["result"], json!({}));
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(dir.path()).await;
        assert!(dispatcher
            .handle(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await
            .is_none());
        assert!(dispatcher
            .handle(json!({"jsonrpc": "2.0", "method": "tools/list"}))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_tools_call_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(dir.path()).await;

        let reply = dispatcher
            .handle(json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                "params": {"name": "register_server", "arguments": {"url": REG_URL}},
            }))
            .await
            .unwrap();
        assert_eq!(reply["result"]["isError"], false);

        let reply = dispatcher
            .handle(json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"}))
            .await
            .unwrap();
        let names: Vec<&str> = reply["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.first().copied(), Some("register_server"));
        assert!(names.contains(&"bella_special-of-day"));

        let reply = dispatcher
            .handle(json!({
                "jsonrpc": "2.0", "id": 4, "method": "tools/call",
                "params": {"name": "bella_special-of-day", "arguments": {"message": "hi"}},
            }))
            .await
            .unwrap();
        assert_eq!(reply["result"]["content"][0]["text"], MOCK_REPLY_TEXT);
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(dir.path()).await;

        let reply = dispatcher
            .handle(json!({"jsonrpc": "2.0", "id": 5, "method": "resources/list"}))
            .await
            .unwrap();
        assert_eq!(reply["error"]["code"], -32601);

        let reply = dispatcher
            .handle(json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call", "params": {}}))
            .await
            .unwrap();
        assert_eq!(reply["error"]["code"], -32602);

        let reply = dispatcher
            .handle(json!({
                "jsonrpc": "2.0", "id": 7, "method": "tools/call",
                "params": {"name": "list_servers", "arguments": [1]},
            }))
            .await
            .unwrap();
        assert_eq!(reply["error"]["code"], -32602);

        let reply: Value =
            serde_json::from_str(&dispatcher.handle_line("{not json").await.unwrap()).unwrap();
        assert_eq!(reply["error"]["code"], -32700);
        assert_eq!(reply["id"], Value::Null);

        let reply = dispatcher.handle(json!([1, 2])).await.unwrap();
        assert_eq!(reply["error"]["code"], -32600);
    }
}
