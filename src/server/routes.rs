//! Axum route handlers for the bridge's HTTP front end.
//!
//! # Routes
//!
//! - `GET  /health`       - Returns status, version and registry counts
//! - `POST /mcp`          - MCP JSON-RPC (same dispatcher as stdio)
//! - `GET  /tools`        - List admin tools and synthesized endpoints
//! - `POST /tools/:name`  - Call one tool; body is the arguments object

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::dispatch::{McpDispatcher, SERVER_NAME};
use crate::bridge::ToolResponse;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: McpDispatcher,
}

impl AppState {
    pub fn new(dispatcher: McpDispatcher) -> Self {
        Self { dispatcher }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/mcp", post(mcp_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/:name", post(call_tool_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health - liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let bridge = state.dispatcher.facade().bridge();
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": SERVER_NAME,
        "agents": bridge.registry().len().await,
        "endpoints": bridge.endpoints().len(),
    }))
}

/// POST /mcp - one JSON-RPC message per request.
///
/// The body is taken raw so malformed JSON gets a JSON-RPC parse error
/// instead of an HTTP rejection. Notifications answer `202 Accepted`.
async fn mcp_handler(State(state): State<AppState>, body: String) -> Response {
    match state.dispatcher.handle_line(&body).await {
        Some(reply) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            reply,
        )
            .into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// GET /tools - tool definitions.
async fn list_tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"tools": state.dispatcher.facade().tool_definitions()}))
}

/// POST /tools/:name - call a tool.
///
/// Failures are reported in the `ToolResponse` body; only a body that is not
/// a JSON object is rejected at the HTTP level.
async fn call_tool_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: String,
) -> Result<Json<ToolResponse>, (StatusCode, Json<Value>)> {
    let arguments = if body.trim().is_empty() {
        json!({})
    } else {
        match serde_json::from_str::<Value>(&body) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "Tool arguments must be a JSON object"})),
                ))
            }
            Err(e) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": format!("Invalid JSON body: {}", e)})),
                ))
            }
        }
    };

    Ok(Json(state.dispatcher.facade().call_tool(&name, &arguments).await))
}
