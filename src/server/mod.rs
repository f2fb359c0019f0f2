//! MCP front ends for the bridge.
//!
//! Both front ends share one [`McpDispatcher`]:
//!
//! - stdio: newline-delimited JSON-RPC on stdin/stdout
//! - HTTP: `GET /health`, `POST /mcp`, `GET /tools`, `POST /tools/:name`

pub mod dispatch;
pub mod routes;
pub mod stdio;

pub use dispatch::McpDispatcher;
pub use routes::{app_router, AppState};
pub use stdio::serve_stdio;
