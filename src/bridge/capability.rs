//! Capability endpoints synthesized from registered agent cards.
//!
//! Every skill advertised by a registered agent becomes one callable
//! endpoint named `<agent id>_<skill slug>`, with a `_<n>` suffix when that
//! name is already taken. Endpoints take a single
//! free-text `message` argument and forward it as an A2A `tasks/send`
//! request targeting that skill.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};

use super::response::{agent_not_found, describe_client_error, ToolDefinition, ToolResponse};
use crate::a2a::types::extract_reply_text;
use crate::a2a::{A2AClient, A2AMessage, AgentSkill};
use crate::registry::{AgentRecord, AgentRegistry};
use crate::utilities::{slugify, MAX_AGENT_ID_LENGTH, MAX_TOOL_NAME_LENGTH};

/// Reply text when the agent's result carries no text part.
pub const NO_REPLY_TEXT: &str = "No reply received";

/// Name of the single argument every capability endpoint accepts.
pub const MESSAGE_ARG: &str = "message";

/// A callable endpoint bound to one skill of one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityEndpoint {
    /// Endpoint name (`<agent id>_<skill slug>`).
    pub name: String,
    /// Registry id of the owning agent.
    pub agent_id: String,
    /// Skill id as advertised, sent as `skillId`.
    pub capability_id: String,
    pub description: String,
    pub input_schema: Value,
}

impl CapabilityEndpoint {
    /// Build the endpoint for `skill` of `agent`.
    ///
    /// Returns `None` if the skill id has no slug-safe characters.
    pub fn new(agent: &AgentRecord, skill: &AgentSkill) -> Option<Self> {
        let name = endpoint_name(&agent.id, &skill.id)?;

        let summary = skill
            .description
            .as_deref()
            .or(skill.name.as_deref())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Invoke capability '{}'", skill.id));

        Some(Self {
            name,
            agent_id: agent.id.clone(),
            capability_id: skill.id.clone(),
            description: format!("{} (agent: {})", summary, agent.agent_card.name),
            input_schema: message_schema(),
        })
    }

    /// Tool metadata for this endpoint.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(&self.name, &self.description, self.input_schema.clone())
    }
}

/// Endpoint name for an agent id and skill id.
///
/// The skill slug is cut so the whole name fits the tool-name limit.
pub fn endpoint_name(agent_id: &str, capability_id: &str) -> Option<String> {
    bounded_name(agent_id, capability_id, "")
}

/// Endpoint name with a `_<n>` disambiguator appended.
///
/// The skill slug gives up room for the suffix, so the result still fits
/// the tool-name limit.
pub fn numbered_endpoint_name(agent_id: &str, capability_id: &str, n: usize) -> Option<String> {
    bounded_name(agent_id, capability_id, &format!("_{}", n))
}

fn bounded_name(agent_id: &str, capability_id: &str, suffix: &str) -> Option<String> {
    let agent = slugify(agent_id, Some(MAX_AGENT_ID_LENGTH));
    let budget = MAX_TOOL_NAME_LENGTH.saturating_sub(agent.len() + 1 + suffix.len());
    let capability = slugify(capability_id, Some(budget));
    if agent.is_empty() || capability.is_empty() {
        return None;
    }
    Some(format!("{}_{}{}", agent, capability, suffix))
}

/// First free numbered name for an endpoint whose natural name is taken.
fn disambiguate(
    endpoints: &BTreeMap<String, CapabilityEndpoint>,
    agent_id: &str,
    capability_id: &str,
) -> Option<String> {
    for n in 2.. {
        let candidate = numbered_endpoint_name(agent_id, capability_id, n)?;
        if !endpoints.contains_key(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn message_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            MESSAGE_ARG: {
                "type": "string",
                "description": "Message to send to the agent",
            }
        },
        "required": [MESSAGE_ARG],
    })
}

/// Outcome of [`CapabilityBridge::sync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Endpoints that did not exist before.
    pub added: usize,
    /// Endpoints whose agent or skill is gone.
    pub retracted: usize,
    /// Endpoints after the sync.
    pub total: usize,
}

/// Materializes and invokes capability endpoints for registered agents.
#[derive(Debug)]
pub struct CapabilityBridge {
    registry: Arc<AgentRegistry>,
    client: A2AClient,
    endpoints: RwLock<BTreeMap<String, CapabilityEndpoint>>,
}

impl CapabilityBridge {
    pub fn new(registry: Arc<AgentRegistry>, client: A2AClient) -> Self {
        Self {
            registry,
            client,
            endpoints: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn client(&self) -> &A2AClient {
        &self.client
    }

    /// Recompute the endpoint set from the registry's current records.
    ///
    /// Records are visited by id and skills in advertised order. When two
    /// pairs map to the same name the first keeps it and later ones get a
    /// numbered name, so every usable (agent, skill) pair has an endpoint.
    pub async fn sync(&self) -> SyncReport {
        let records = self.registry.list().await;

        let mut fresh = BTreeMap::new();
        for record in &records {
            for skill in &record.agent_card.skills {
                let Some(mut endpoint) = CapabilityEndpoint::new(record, skill) else {
                    log::warn!(
                        "Agent '{}' skill '{}' has no usable name; skipping",
                        record.id,
                        skill.id
                    );
                    continue;
                };
                if fresh.contains_key(&endpoint.name) {
                    let Some(name) = disambiguate(&fresh, &record.id, &skill.id) else {
                        log::warn!(
                            "Agent '{}' skill '{}' has no free endpoint name; skipping",
                            record.id,
                            skill.id
                        );
                        continue;
                    };
                    log::warn!(
                        "Agent '{}' skill '{}' collides with endpoint '{}'; exposing it as '{}'",
                        record.id,
                        skill.id,
                        endpoint.name,
                        name
                    );
                    endpoint.name = name;
                }
                fresh.insert(endpoint.name.clone(), endpoint);
            }
        }

        let mut endpoints = self.endpoints.write();
        let added = fresh.keys().filter(|k| !endpoints.contains_key(*k)).count();
        let retracted = endpoints.keys().filter(|k| !fresh.contains_key(*k)).count();
        *endpoints = fresh;

        let report = SyncReport {
            added,
            retracted,
            total: endpoints.len(),
        };
        log::debug!(
            "Endpoint sync over {} agent(s): +{} -{} = {}",
            records.len(),
            report.added,
            report.retracted,
            report.total
        );
        report
    }

    /// All endpoints, ordered by name.
    pub fn endpoints(&self) -> Vec<CapabilityEndpoint> {
        self.endpoints.read().values().cloned().collect()
    }

    /// Endpoints owned by one agent.
    pub fn endpoints_for(&self, agent_id: &str) -> Vec<CapabilityEndpoint> {
        self.endpoints
            .read()
            .values()
            .filter(|e| e.agent_id == agent_id)
            .cloned()
            .collect()
    }

    pub fn endpoint(&self, name: &str) -> Option<CapabilityEndpoint> {
        self.endpoints.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.endpoints.read().contains_key(name)
    }

    /// Invoke endpoint `name` with a free-text message.
    pub async fn invoke(&self, name: &str, message: &str) -> ToolResponse {
        let Some(endpoint) = self.endpoint(name) else {
            return ToolResponse::error(format!("Unknown endpoint: {}", name));
        };

        let record = match self.registry.get(&endpoint.agent_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return ToolResponse::error(agent_not_found(&endpoint.agent_id)),
            Err(e) => return ToolResponse::error(e.to_string()),
        };

        log::info!(
            "Invoking '{}' on agent '{}' ({})",
            endpoint.capability_id,
            record.id,
            record.endpoint_url()
        );
        match self
            .client
            .invoke(
                record.endpoint_url(),
                &endpoint.capability_id,
                A2AMessage::user_text(message),
            )
            .await
        {
            Ok(result) => ToolResponse::text(
                extract_reply_text(&result).unwrap_or_else(|| NO_REPLY_TEXT.to_string()),
            ),
            Err(e) => {
                log::warn!("Endpoint '{}' failed: {}", name, e);
                ToolResponse::error(describe_client_error(&record.id, &e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2a::types::agent_card_url;
    use crate::a2a::{InMemoryTransport, MOCK_REPLY_TEXT};

    const REG_URL: &str = "https://example.test/agent";
    const ENDPOINT: &str = "https://bella.test/rpc";

    fn bella_card(skills: &[&str]) -> Value {
        json!({
            "id": "Bella",
            "name": "Bella",
            "url": ENDPOINT,
            "version": "1.0.0",
            "capabilities": {},
            "skills": skills.iter().map(|s| json!({"id": s, "description": "Today's special"})).collect::<Vec<_>>(),
        })
    }

    async fn setup(
        mock: bool,
    ) -> (tempfile::TempDir, Arc<InMemoryTransport>, Arc<AgentRegistry>, CapabilityBridge) {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(InMemoryTransport::new());
        let client = A2AClient::new(transport.clone(), mock);
        let registry = Arc::new(AgentRegistry::new(dir.path(), client.clone()));
        registry.init().await.unwrap();
        let bridge = CapabilityBridge::new(registry.clone(), client);
        (dir, transport, registry, bridge)
    }

    #[test]
    fn test_endpoint_name_is_bounded() {
        assert_eq!(
            endpoint_name("bella", "special-of-day").as_deref(),
            Some("bella_special-of-day")
        );
        let long = "x".repeat(200);
        let name = endpoint_name("abcdefghijklmnopqrst", &long).unwrap();
        assert_eq!(name.len(), MAX_TOOL_NAME_LENGTH);
        assert!(endpoint_name("bella", "???").is_none());

        assert_eq!(
            numbered_endpoint_name("a", "b_c", 2).as_deref(),
            Some("a_b_c_2")
        );
        let numbered = numbered_endpoint_name("abcdefghijklmnopqrst", &long, 12).unwrap();
        assert_eq!(numbered.len(), MAX_TOOL_NAME_LENGTH);
        assert!(numbered.ends_with("x_12"));
    }

    #[tokio::test]
    async fn test_sync_materializes_one_endpoint_per_skill() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&["special-of-day", "Menu Lookup"]));
        registry.register(REG_URL).await.unwrap();

        let report = bridge.sync().await;
        assert_eq!(report, SyncReport { added: 2, retracted: 0, total: 2 });
        assert!(bridge.contains("bella_special-of-day"));
        assert!(bridge.contains("bella_menu-lookup"));

        let endpoint = bridge.endpoint("bella_menu-lookup").unwrap();
        assert_eq!(endpoint.capability_id, "Menu Lookup");
        assert_eq!(endpoint.input_schema["required"][0], MESSAGE_ARG);
        assert!(endpoint.description.contains("Bella"));
    }

    #[tokio::test]
    async fn test_sync_is_idempotent_and_retracts() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&["special-of-day"]));
        registry.register(REG_URL).await.unwrap();

        bridge.sync().await;
        let again = bridge.sync().await;
        assert_eq!(again, SyncReport { added: 0, retracted: 0, total: 1 });

        registry.remove("bella").await.unwrap();
        let after = bridge.sync().await;
        assert_eq!(after, SyncReport { added: 0, retracted: 1, total: 0 });
        assert!(bridge.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_colliding_names_across_agents_stay_distinct() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        for (reg, id, skill) in [("https://ab.test", "a_b", "c"), ("https://a.test", "a", "b_c")] {
            transport.respond_json(
                agent_card_url(reg),
                json!({
                    "id": id,
                    "name": id,
                    "url": format!("{}/rpc", reg),
                    "version": "1.0.0",
                    "capabilities": {},
                    "skills": [{"id": skill}],
                }),
            );
            transport.respond_json(
                format!("{}/rpc", reg),
                json!({"result": {"status": {"state": "completed", "message": {
                    "role": "agent", "parts": [{"type": "text", "text": format!("from {}", id)}]
                }}}}),
            );
            registry.register(reg).await.unwrap();
        }

        let report = bridge.sync().await;
        assert_eq!(report.total, 2);
        let routes: Vec<(String, String, String)> = bridge
            .endpoints()
            .into_iter()
            .map(|e| (e.name, e.agent_id, e.capability_id))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("a_b_c".to_string(), "a".to_string(), "b_c".to_string()),
                ("a_b_c_2".to_string(), "a_b".to_string(), "c".to_string()),
            ]
        );

        assert_eq!(bridge.invoke("a_b_c", "hi").await.first_text(), "from a");
        assert_eq!(bridge.invoke("a_b_c_2", "hi").await.first_text(), "from a_b");

        // Names are stable across syncs.
        assert_eq!(bridge.sync().await, SyncReport { added: 0, retracted: 0, total: 2 });
        assert_eq!(bridge.endpoint("a_b_c_2").unwrap().agent_id, "a_b");
    }

    #[tokio::test]
    async fn test_colliding_skills_within_one_agent_are_numbered() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&["Menu", "menu", "MENU"]));
        registry.register(REG_URL).await.unwrap();

        assert_eq!(bridge.sync().await.total, 3);
        assert_eq!(bridge.endpoint("bella_menu").unwrap().capability_id, "Menu");
        assert_eq!(bridge.endpoint("bella_menu_2").unwrap().capability_id, "menu");
        assert_eq!(bridge.endpoint("bella_menu_3").unwrap().capability_id, "MENU");
    }

    #[tokio::test]
    async fn test_agent_without_skills_has_no_endpoints() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&[]));
        registry.register(REG_URL).await.unwrap();

        assert_eq!(bridge.sync().await.total, 0);
        assert!(bridge.endpoints_for("bella").is_empty());
    }

    #[tokio::test]
    async fn test_invoke_returns_reply_text() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&["special-of-day"]));
        transport.respond_json(
            ENDPOINT,
            json!({"jsonrpc": "2.0", "id": "1", "result": {
                "status": {"state": "completed", "message": {"role": "agent", "parts": [{"type": "text", "text": "Lasagna"}]}}
            }}),
        );
        registry.register(REG_URL).await.unwrap();
        bridge.sync().await;

        let response = bridge.invoke("bella_special-of-day", "what's good?").await;
        assert!(!response.is_error);
        assert_eq!(response.first_text(), "Lasagna");

        let sent = transport.sent();
        let (_, body) = sent.last().unwrap();
        assert_eq!(body["params"]["metadata"]["skillId"], "special-of-day");
    }

    #[tokio::test]
    async fn test_invoke_without_text_reports_no_reply() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&["special-of-day"]));
        transport.respond_json(ENDPOINT, json!({"result": {"status": {"state": "working"}}}));
        registry.register(REG_URL).await.unwrap();
        bridge.sync().await;

        let response = bridge.invoke("bella_special-of-day", "hi").await;
        assert!(!response.is_error);
        assert_eq!(response.first_text(), NO_REPLY_TEXT);
    }

    #[tokio::test]
    async fn test_invoke_in_mock_mode() {
        let (_dir, transport, registry, bridge) = setup(true).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&["special-of-day"]));
        registry.register(REG_URL).await.unwrap();
        bridge.sync().await;

        let response = bridge.invoke("bella_special-of-day", "what's good?").await;
        assert!(!response.is_error);
        assert_eq!(response.first_text(), MOCK_REPLY_TEXT);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_passes_remote_error_through() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&["special-of-day"]));
        transport.respond_json(
            ENDPOINT,
            json!({"jsonrpc": "2.0", "id": "1", "error": {"code": -32001, "message": "Task Not Found"}}),
        );
        registry.register(REG_URL).await.unwrap();
        bridge.sync().await;

        let response = bridge.invoke("bella_special-of-day", "hi").await;
        assert!(response.is_error);
        assert_eq!(response.first_text(), "Task Not Found");
    }

    #[tokio::test]
    async fn test_invoke_transport_failure() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        transport.respond_json(agent_card_url(REG_URL), bella_card(&["special-of-day"]));
        transport.respond_status(ENDPOINT, 502);
        registry.register(REG_URL).await.unwrap();
        bridge.sync().await;

        let response = bridge.invoke("bella_special-of-day", "hi").await;
        assert!(response.is_error);
        assert!(response.first_text().starts_with("Failed to reach agent 'bella' (status)"));
    }

    #[tokio::test]
    async fn test_invoke_unknown_or_stale_endpoint() {
        let (_dir, transport, registry, bridge) = setup(false).await;
        let response = bridge.invoke("nobody_nothing", "hi").await;
        assert!(response.is_error);
        assert_eq!(response.first_text(), "Unknown endpoint: nobody_nothing");

        transport.respond_json(agent_card_url(REG_URL), bella_card(&["special-of-day"]));
        registry.register(REG_URL).await.unwrap();
        bridge.sync().await;
        registry.remove("bella").await.unwrap();

        // Not yet retracted, but the agent is gone.
        let response = bridge.invoke("bella_special-of-day", "hi").await;
        assert!(response.is_error);
        assert_eq!(response.first_text(), "Agent 'bella' not found");
    }
}
