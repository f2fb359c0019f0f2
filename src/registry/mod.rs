//! Durable registry of remote A2A agents.
//!
//! Each agent is stored as `<storage_dir>/<id>.json` and mirrored in an
//! in-memory cache. Identifiers are slugs of at most 20 characters, taken
//! from the agent card's own `id` when it has one and generated otherwise.

pub mod error;
pub mod record;
pub mod store;

pub use error::RegistryError;
pub use record::{validate_agent_card, AgentRecord};
pub use store::AgentRegistry;
