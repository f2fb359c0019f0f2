//! Administrative tools and tool dispatch.
//!
//! The facade is what the MCP front end talks to. It exposes a fixed set of
//! administrative tools on top of the registry and the client, plus every
//! endpoint currently materialized by the [`CapabilityBridge`]. Nothing here
//! returns an error across the boundary; failures become error results.

use std::sync::Arc;

use serde_json::{json, Value};

use super::capability::{CapabilityBridge, MESSAGE_ARG};
use super::response::{agent_not_found, describe_client_error, ToolDefinition, ToolResponse};
use crate::a2a::{A2AMessage, Part};
use crate::registry::AgentRegistry;

pub const REGISTER_SERVER: &str = "register_server";
pub const RELOAD_SERVERS: &str = "reload_servers";
pub const LIST_SERVERS: &str = "list_servers";
pub const GET_SERVER_DETAILS: &str = "get_server_details";
pub const REMOVE_SERVER: &str = "remove_server";
pub const SEND_RAW_TASK: &str = "send_raw_task";

/// Front-end facade over registry, client and capability bridge.
#[derive(Debug, Clone)]
pub struct BridgeFacade {
    registry: Arc<AgentRegistry>,
    bridge: Arc<CapabilityBridge>,
}

impl BridgeFacade {
    pub fn new(bridge: Arc<CapabilityBridge>) -> Self {
        Self {
            registry: bridge.registry().clone(),
            bridge,
        }
    }

    pub fn bridge(&self) -> &Arc<CapabilityBridge> {
        &self.bridge
    }

    /// Register the agent at `url` and materialize its endpoints.
    pub async fn register(&self, url: &str) -> ToolResponse {
        let record = match self.registry.register(url).await {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Registration of {} failed: {}", url.trim(), e);
                return ToolResponse::error(e.to_string());
            }
        };
        self.bridge.sync().await;

        let names: Vec<String> = self
            .bridge
            .endpoints_for(&record.id)
            .into_iter()
            .map(|e| e.name)
            .collect();
        let endpoints = if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        };
        ToolResponse::text(format!(
            "Registered agent '{}' with id '{}'. Endpoints: {}",
            record.agent_card.name, record.id, endpoints
        ))
    }

    /// Rebuild the registry from disk and resynchronize endpoints.
    pub async fn reload_servers(&self) -> ToolResponse {
        let count = self.registry.reload_servers().await;
        let report = self.bridge.sync().await;
        ToolResponse::text(format!(
            "Reloaded {} server(s); {} endpoint(s) available",
            count, report.total
        ))
    }

    /// One line per registered agent.
    pub async fn list(&self) -> ToolResponse {
        let records = self.registry.list().await;
        if records.is_empty() {
            return ToolResponse::text("No servers registered");
        }
        let lines: Vec<String> = records
            .iter()
            .map(|r| format!("{}: {} ({})", r.id, r.agent_card.name, r.endpoint_url()))
            .collect();
        ToolResponse::text(lines.join("\n"))
    }

    /// Full stored record of one agent.
    pub async fn get_details(&self, id: &str) -> ToolResponse {
        match self.registry.get(id).await {
            Ok(Some(record)) => ToolResponse::json(&record),
            Ok(None) => ToolResponse::error(agent_not_found(id)),
            Err(e) => ToolResponse::error(e.to_string()),
        }
    }

    /// Unregister an agent and retract its endpoints.
    pub async fn remove(&self, id: &str) -> ToolResponse {
        match self.registry.remove(id).await {
            Ok(true) => {
                self.bridge.sync().await;
                ToolResponse::text(format!("Removed server '{}'", id))
            }
            Ok(false) => ToolResponse::error(agent_not_found(id)),
            Err(e) => ToolResponse::error(e.to_string()),
        }
    }

    /// Send a task to an agent under a caller-chosen task id, bypassing the
    /// synthesized endpoints. Returns the raw `result` object.
    ///
    /// Without a message the task is sent with no parts.
    pub async fn raw_invoke(&self, id: &str, task_id: &str, message: Option<&str>) -> ToolResponse {
        let record = match self.registry.get(id).await {
            Ok(Some(record)) => record,
            Ok(None) => return ToolResponse::error(agent_not_found(id)),
            Err(e) => return ToolResponse::error(e.to_string()),
        };

        let payload = A2AMessage {
            role: "user".to_string(),
            parts: message.map(Part::text).into_iter().collect(),
        };
        match self
            .bridge
            .client()
            .send_task(record.endpoint_url(), task_id, payload, None)
            .await
        {
            Ok(result) => ToolResponse::json(&result),
            Err(e) => {
                log::warn!("Raw task {} to '{}' failed: {}", task_id, record.id, e);
                ToolResponse::error(describe_client_error(&record.id, &e))
            }
        }
    }

    /// Administrative tools followed by every synthesized endpoint.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut tools = admin_tool_definitions();
        tools.extend(self.bridge.endpoints().iter().map(|e| e.definition()));
        tools
    }

    /// Dispatch a tool call by name.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> ToolResponse {
        log::debug!("Tool call: {}", name);
        match name {
            REGISTER_SERVER => match required_arg(arguments, "url") {
                Ok(url) => self.register(url).await,
                Err(response) => response,
            },
            RELOAD_SERVERS => self.reload_servers().await,
            LIST_SERVERS => self.list().await,
            GET_SERVER_DETAILS => match required_arg(arguments, "id") {
                Ok(id) => self.get_details(id).await,
                Err(response) => response,
            },
            REMOVE_SERVER => match required_arg(arguments, "id") {
                Ok(id) => self.remove(id).await,
                Err(response) => response,
            },
            SEND_RAW_TASK => {
                let id = match required_arg(arguments, "id") {
                    Ok(id) => id,
                    Err(response) => return response,
                };
                let task_id = match required_arg(arguments, "task_id") {
                    Ok(task_id) => task_id,
                    Err(response) => return response,
                };
                let message = arguments.get(MESSAGE_ARG).and_then(Value::as_str);
                self.raw_invoke(id, task_id, message).await
            }
            _ if self.bridge.contains(name) => match required_arg(arguments, MESSAGE_ARG) {
                Ok(message) => self.bridge.invoke(name, message).await,
                Err(response) => response,
            },
            _ => ToolResponse::error(format!("Unknown endpoint: {}", name)),
        }
    }
}

fn required_arg<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, ToolResponse> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolResponse::error(format!("Missing required argument: {}", key)))
}

fn string_schema(required: &[&str], properties: Value) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Definitions of the administrative tools.
pub fn admin_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            REGISTER_SERVER,
            "Register a remote A2A agent by URL and expose its skills as tools",
            string_schema(
                &["url"],
                json!({"url": {"type": "string", "description": "Base URL serving /.well-known/agent.json"}}),
            ),
        ),
        ToolDefinition::new(
            RELOAD_SERVERS,
            "Reload registered agents from storage",
            string_schema(&[], json!({})),
        ),
        ToolDefinition::new(
            LIST_SERVERS,
            "List registered agents",
            string_schema(&[], json!({})),
        ),
        ToolDefinition::new(
            GET_SERVER_DETAILS,
            "Show the stored record of a registered agent",
            string_schema(&["id"], json!({"id": {"type": "string", "description": "Agent id"}})),
        ),
        ToolDefinition::new(
            REMOVE_SERVER,
            "Unregister an agent and remove its tools",
            string_schema(&["id"], json!({"id": {"type": "string", "description": "Agent id"}})),
        ),
        ToolDefinition::new(
            SEND_RAW_TASK,
            "Send a task with an explicit task id to a registered agent and return the raw result",
            string_schema(
                &["id", "task_id"],
                json!({
                    "id": {"type": "string", "description": "Agent id"},
                    "task_id": {"type": "string", "description": "Task id to send"},
                    "message": {"type": "string", "description": "Optional message text"},
                }),
            ),
        ),
    ]
}
