//! Capability bridge: turns registered agents' skills into callable tools.
//!
//! - `capability`: endpoint synthesis, sync and invocation.
//! - `facade`: administrative tools and name-based dispatch.
//! - `response`: the `ToolResponse` envelope and error message mapping.

pub mod capability;
pub mod facade;
pub mod response;

pub use capability::{CapabilityBridge, CapabilityEndpoint, SyncReport, NO_REPLY_TEXT};
pub use facade::BridgeFacade;
pub use response::{describe_client_error, TextContent, ToolDefinition, ToolResponse};
