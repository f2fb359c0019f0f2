//! A2A client for remote agent invocation.
//!
//! Fetches agent cards and sends `tasks/send` JSON-RPC requests over a
//! pluggable [`AgentTransport`]. In mock mode no request leaves the process:
//! a completed task with a fixed reply is synthesized instead.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::errors::A2AError;
use super::transports::{AgentTransport, TransportError};
use super::types::{
    agent_card_url, A2AMessage, JsonRpcRequest, JsonRpcResponse, TaskSendParams,
    SEND_TASK_METHOD,
};

/// Reply text of every task answered in mock mode.
pub const MOCK_REPLY_TEXT: &str = "Mock response: the task was received but no agent was contacted.";

/// Failure of a remote call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The agent could not be reached or answered with garbage.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The agent answered with a JSON-RPC error object.
    #[error("{}", .0.display_message())]
    Remote(A2AError),
}

/// Client for communicating with remote A2A agents.
#[derive(Clone)]
pub struct A2AClient {
    transport: Arc<dyn AgentTransport>,
    /// When set, task requests are answered locally.
    mock: bool,
}

impl std::fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2AClient")
            .field("transport", &self.transport.transport_type())
            .field("mock", &self.mock)
            .finish()
    }
}

impl A2AClient {
    /// Create a new `A2AClient`.
    ///
    /// # Arguments
    ///
    /// * `transport` - Transport used for card fetches and task requests.
    /// * `mock` - Answer task requests locally instead of calling the agent.
    pub fn new(transport: Arc<dyn AgentTransport>, mock: bool) -> Self {
        Self { transport, mock }
    }

    /// Whether task requests are answered locally.
    pub fn is_mock(&self) -> bool {
        self.mock
    }

    /// Retrieve the raw agent card for a registration URL.
    ///
    /// Fetches `<registration_url>/.well-known/agent.json`. Card fetches are
    /// never mocked.
    pub async fn fetch_agent_card(&self, registration_url: &str) -> Result<Value, ClientError> {
        let url = agent_card_url(registration_url);
        log::debug!("Fetching agent card from: {}", url);
        Ok(self.transport.get_json(&url).await?)
    }

    /// Invoke one capability of a remote agent under a fresh task id.
    ///
    /// # Arguments
    ///
    /// * `endpoint_url` - The agent's own JSON-RPC endpoint (card `url`).
    /// * `capability_id` - Skill to target; sent as `params.metadata.skillId`.
    /// * `payload` - Message handed to the agent.
    pub async fn invoke(
        &self,
        endpoint_url: &str,
        capability_id: &str,
        payload: A2AMessage,
    ) -> Result<Value, ClientError> {
        let task_id = Uuid::new_v4().to_string();
        self.send_task(endpoint_url, &task_id, payload, Some(capability_id))
            .await
    }

    /// Send a `tasks/send` request and return the `result` payload.
    ///
    /// Every request carries a freshly generated correlation id.
    pub async fn send_task(
        &self,
        endpoint_url: &str,
        task_id: &str,
        payload: A2AMessage,
        capability_id: Option<&str>,
    ) -> Result<Value, ClientError> {
        let metadata = capability_id.map(|skill| {
            let mut m = Map::new();
            m.insert("skillId".to_string(), Value::String(skill.to_string()));
            m
        });
        let request = JsonRpcRequest::new(
            Uuid::new_v4().to_string(),
            SEND_TASK_METHOD,
            TaskSendParams {
                id: task_id.to_string(),
                message: payload,
                metadata,
            },
        );

        if self.mock {
            log::info!(
                "Mock mode: answering task {} for {} locally",
                task_id,
                endpoint_url
            );
            return Ok(mock_task_result(task_id));
        }

        log::debug!("Sending A2A task {} to: {}", task_id, endpoint_url);
        let body = serde_json::to_value(&request).map_err(|e| TransportError::Request {
            url: endpoint_url.to_string(),
            message: e.to_string(),
        })?;
        let raw = self.transport.post_json(endpoint_url, &body).await?;

        let response: JsonRpcResponse =
            serde_json::from_value(raw).map_err(|e| TransportError::Decode {
                url: endpoint_url.to_string(),
                message: e.to_string(),
            })?;

        if let Some(error) = response.error {
            log::warn!(
                "Agent at {} rejected task {}: {}",
                endpoint_url,
                task_id,
                error
            );
            return Err(ClientError::Remote(error));
        }

        response.result.ok_or_else(|| {
            ClientError::Transport(TransportError::Decode {
                url: endpoint_url.to_string(),
                message: "response carries neither result nor error".to_string(),
            })
        })
    }
}

/// The completed task synthesized in mock mode.
fn mock_task_result(task_id: &str) -> Value {
    json!({
        "id": task_id,
        "status": {
            "state": "completed",
            "message": {
                "role": "agent",
                "parts": [{"type": "text", "text": MOCK_REPLY_TEXT}],
            },
        },
        "metadata": {"mock": true},
    })
}
