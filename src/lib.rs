//! # a2a-mcp-bridge
//!
//! Bridges the Model Context Protocol (MCP) to remote Agent-to-Agent (A2A)
//! agents.
//!
//! Remote agents are registered by URL; their agent cards are fetched,
//! validated and persisted in a durable registry. Every skill an agent
//! advertises is exposed as an MCP tool named `<agent id>_<skill>`, and tool
//! calls are forwarded as A2A `tasks/send` requests. A small set of
//! administrative tools manages the registry itself.
//!
//! - [`registry`]: durable, cached agent records
//! - [`a2a`]: wire types, transports and the A2A client
//! - [`bridge`]: capability endpoints and the administrative facade
//! - [`server`]: MCP front ends (stdio and HTTP)

pub mod a2a;
pub mod bridge;
pub mod config;
pub mod registry;
pub mod server;
pub mod utilities;

pub use a2a::{A2AClient, AgentCard, HttpTransport, InMemoryTransport};
pub use bridge::{BridgeFacade, CapabilityBridge, ToolResponse};
pub use config::BridgeConfig;
pub use registry::{AgentRecord, AgentRegistry, RegistryError};

/// Crate version, announced by `initialize` and `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
