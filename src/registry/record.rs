//! Registered agent records and agent card validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RegistryError;
use crate::a2a::AgentCard;

/// One registered remote agent, as cached and as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    /// Registry identifier; also the file stem on disk.
    pub id: String,
    /// URL the agent was registered with.
    pub registration_url: String,
    /// The agent card fetched at registration time.
    pub agent_card: AgentCard,
    /// When the record was created.
    pub added_at: DateTime<Utc>,
}

impl AgentRecord {
    /// Create a record stamped with the current time.
    pub fn new(id: impl Into<String>, registration_url: impl Into<String>, agent_card: AgentCard) -> Self {
        Self {
            id: id.into(),
            registration_url: registration_url.into(),
            agent_card,
            added_at: Utc::now(),
        }
    }

    /// The agent's own JSON-RPC endpoint.
    pub fn endpoint_url(&self) -> &str {
        &self.agent_card.url
    }

    /// Whether this record describes the same registration.
    ///
    /// Both the registration URL and the card's endpoint URL must match. A
    /// trailing `/` on either registration URL is ignored.
    pub fn matches(&self, registration_url: &str, agent_url: &str) -> bool {
        self.registration_url.trim_end_matches('/') == registration_url.trim_end_matches('/')
            && self.agent_card.url == agent_url
    }
}

fn required_string(card: &serde_json::Map<String, Value>, field: &str) -> Result<(), RegistryError> {
    match card.get(field) {
        None | Some(Value::Null) => Err(RegistryError::validation(field, "is missing")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(RegistryError::validation(field, "must not be blank"))
        }
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(RegistryError::validation(field, "must be a string")),
    }
}

/// Validate a raw agent card and convert it into an [`AgentCard`].
///
/// `name`, `url` and `version` must be non-blank strings, `capabilities`
/// must be present, and `skills` must be a list of objects with non-blank
/// string ids. A non-string `id` is treated as absent.
pub fn validate_agent_card(raw: Value) -> Result<AgentCard, RegistryError> {
    let mut card = match raw {
        Value::Object(map) => map,
        _ => return Err(RegistryError::validation("card", "must be a JSON object")),
    };

    for field in ["name", "url", "version"] {
        required_string(&card, field)?;
    }

    if matches!(card.get("capabilities"), None | Some(Value::Null)) {
        return Err(RegistryError::validation("capabilities", "is missing"));
    }

    match card.get("skills") {
        None | Some(Value::Null) => return Err(RegistryError::validation("skills", "is missing")),
        Some(Value::Array(skills)) => {
            for (i, skill) in skills.iter().enumerate() {
                let field = format!("skills[{}].id", i);
                match skill.get("id") {
                    Some(Value::String(id)) if !id.trim().is_empty() => {}
                    Some(Value::String(_)) => {
                        return Err(RegistryError::validation(&field, "must not be blank"))
                    }
                    _ => return Err(RegistryError::validation(&field, "is missing")),
                }
            }
        }
        Some(_) => return Err(RegistryError::validation("skills", "must be a list")),
    }

    if matches!(card.get("id"), Some(v) if !v.is_string()) {
        log::debug!("Ignoring non-string agent card id: {}", card["id"]);
        card.remove("id");
    }

    serde_json::from_value(Value::Object(card))
        .map_err(|e| RegistryError::validation("card", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_card() -> Value {
        json!({
            "id": "Bella",
            "name": "Bella",
            "url": "https://bella.test/rpc",
            "version": "1.0.0",
            "capabilities": {"streaming": false},
            "skills": [{"id": "special-of-day", "name": "Special of the day"}],
        })
    }

    fn field_of(err: RegistryError) -> String {
        match err {
            RegistryError::ManifestValidation { field, .. } => field,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_valid_card() {
        let card = validate_agent_card(valid_card()).unwrap();
        assert_eq!(card.id.as_deref(), Some("Bella"));
        assert_eq!(card.skills.len(), 1);
        assert_eq!(card.skills[0].name.as_deref(), Some("Special of the day"));
    }

    #[test]
    fn test_missing_and_blank_required_fields() {
        for field in ["name", "url", "version", "capabilities", "skills"] {
            let mut raw = valid_card();
            raw.as_object_mut().unwrap().remove(field);
            assert_eq!(field_of(validate_agent_card(raw).unwrap_err()), field);
        }

        let mut blank = valid_card();
        blank["name"] = json!("   ");
        assert_eq!(field_of(validate_agent_card(blank).unwrap_err()), "name");

        let mut wrong_type = valid_card();
        wrong_type["version"] = json!(1);
        assert_eq!(field_of(validate_agent_card(wrong_type).unwrap_err()), "version");
    }

    #[test]
    fn test_skills_must_be_a_list_with_ids() {
        let mut not_list = valid_card();
        not_list["skills"] = json!({"id": "x"});
        assert_eq!(field_of(validate_agent_card(not_list).unwrap_err()), "skills");

        let mut no_id = valid_card();
        no_id["skills"] = json!([{"id": "ok"}, {"name": "anonymous"}]);
        assert_eq!(field_of(validate_agent_card(no_id).unwrap_err()), "skills[1].id");

        let mut empty = valid_card();
        empty["skills"] = json!([]);
        assert!(validate_agent_card(empty).unwrap().skills.is_empty());
    }

    #[test]
    fn test_non_object_and_non_string_id() {
        assert_eq!(field_of(validate_agent_card(json!([1, 2])).unwrap_err()), "card");

        let mut numeric_id = valid_card();
        numeric_id["id"] = json!(42);
        assert!(validate_agent_card(numeric_id).unwrap().id.is_none());
    }

    #[test]
    fn test_record_matches_requires_both_urls() {
        let card = validate_agent_card(valid_card()).unwrap();
        let record = AgentRecord::new("bella", "https://example.test/agent", card);
        assert!(record.matches("https://example.test/agent", "https://bella.test/rpc"));
        assert!(!record.matches("https://example.test/agent", "https://bella.test/v2"));
        assert!(!record.matches("https://other.test/agent", "https://bella.test/rpc"));
        assert_eq!(record.endpoint_url(), "https://bella.test/rpc");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let card = validate_agent_card(valid_card()).unwrap();
        let record = AgentRecord::new("bella", "https://example.test/agent", card);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["registrationUrl"], "https://example.test/agent");
        assert_eq!(value["agentCard"]["name"], "Bella");
        assert!(value["addedAt"].is_string());

        let back: AgentRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
