//! A2A (Agent-to-Agent) protocol module.
//!
//! Provides the agent card and JSON-RPC types, error codes, transports and
//! the client used to fetch cards and send tasks to remote agents.

pub mod client;
pub mod errors;
pub mod transports;
pub mod types;

pub use client::{A2AClient, ClientError, MOCK_REPLY_TEXT};
pub use errors::{A2AError, A2AErrorCode};
pub use transports::{AgentTransport, HttpTransport, InMemoryTransport, TransportError, TransportType};
pub use types::{A2AMessage, AgentCard, AgentSkill, Part};
