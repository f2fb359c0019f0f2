//! a2a-bridge server binary.
//!
//! Loads the agent registry, materializes one MCP tool per registered agent
//! skill and serves MCP over stdio or HTTP.
//!
//! # Environment Variables
//!
//! - `A2A_BRIDGE_CONFIG` - Optional YAML config file
//! - `A2A_BRIDGE_STORAGE_DIR` - Directory of agent record files
//! - `A2A_BRIDGE_MOCK` - Answer tasks locally (`1`/`true`/`yes`/`on`)
//! - `A2A_BRIDGE_FRONTEND` - `stdio` (default) or `http`
//! - `A2A_BRIDGE_BIND` - HTTP listen address (default: 127.0.0.1:8080)
//! - `A2A_BRIDGE_TIMEOUT_SECS` - Outbound request timeout (default: 30)
//! - `RUST_LOG` - Tracing filter (default: "info,a2a_mcp_bridge=debug")
//!
//! Logs always go to stderr so stdout stays free for stdio framing.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin a2a-bridge
//! # or over HTTP:
//! A2A_BRIDGE_FRONTEND=http cargo run --bin a2a-bridge
//! ```

use std::sync::Arc;

use anyhow::Context;

use a2a_mcp_bridge::a2a::{A2AClient, HttpTransport};
use a2a_mcp_bridge::bridge::{BridgeFacade, CapabilityBridge};
use a2a_mcp_bridge::config::{BridgeConfig, FrontendTransport};
use a2a_mcp_bridge::registry::AgentRegistry;
use a2a_mcp_bridge::server::{app_router, serve_stdio, AppState, McpDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,a2a_mcp_bridge=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BridgeConfig::load().context("Invalid configuration")?;
    tracing::info!(
        "a2a-bridge {} starting (frontend: {}, mock: {}, storage: {})",
        a2a_mcp_bridge::VERSION,
        config.frontend,
        config.mock_mode,
        config.storage_dir.display()
    );

    let transport = HttpTransport::new(config.request_timeout_secs)
        .context("Failed to build HTTP client")?;
    let client = A2AClient::new(Arc::new(transport), config.mock_mode);

    let registry = Arc::new(AgentRegistry::new(&config.storage_dir, client.clone()));
    let loaded = registry
        .init()
        .await
        .context("Failed to initialize agent storage")?;

    let bridge = Arc::new(CapabilityBridge::new(registry, client));
    let report = bridge.sync().await;
    tracing::info!(
        "{} agent(s) loaded, {} endpoint(s) available",
        loaded,
        report.total
    );

    let dispatcher = McpDispatcher::new(BridgeFacade::new(bridge));

    match config.frontend {
        FrontendTransport::Stdio => {
            tokio::select! {
                result = serve_stdio(&dispatcher) => result.context("stdio front end failed")?,
                _ = shutdown_signal() => tracing::info!("Shutting down"),
            }
        }
        FrontendTransport::Http => {
            let app = app_router(AppState::new(dispatcher));
            let listener = tokio::net::TcpListener::bind(config.bind_addr)
                .await
                .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

            tracing::info!("HTTP front end listening on {}", config.bind_addr);
            tracing::info!("Endpoints:");
            tracing::info!("  GET  /health       - liveness probe");
            tracing::info!("  POST /mcp          - MCP JSON-RPC");
            tracing::info!("  GET  /tools        - tool definitions");
            tracing::info!("  POST /tools/:name  - call a tool");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Server failed")?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
