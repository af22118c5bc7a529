//! HTTP surface for the agent.
//!
//! Exposes the tool registry for agent discovery and a single-session
//! chat endpoint, as a JSON API suitable for embedding the agent behind
//! a web front-end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/tools/list` | List the registered tools with schemas |
//! | `POST` | `/tools/{name}` | Call a tool by name |
//! | `POST` | `/chat` | Run one conversation turn |
//!
//! # Error Contract
//!
//! Tool and request errors use the envelope:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "message must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `tool_error` (500).
//!
//! A `/chat` turn that fails past every tool boundary still answers 200
//! with a generic system-error reply; the session is preserved, never
//! torn down by a failed turn.
//!
//! # Sessions
//!
//! The server holds exactly one conversation session behind a mutex.
//! Multi-user session management is out of scope by design.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based front-ends.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::router::{Router as AgentRouter, SYSTEM_ERROR_REPLY};
use crate::session::SessionState;
use crate::tools::{ToolContext, ToolRegistry};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    tools: Arc<ToolRegistry>,
    ctx: Arc<ToolContext>,
    agent: Arc<AgentRouter>,
    session: Arc<Mutex<SessionState>>,
}

/// Start the HTTP server on the configured bind address.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let config = Arc::new(config.clone());

    let state = AppState {
        tools: Arc::new(ToolRegistry::with_builtins()),
        ctx: Arc::new(ToolContext::from_config(config.clone())?),
        agent: Arc::new(AgentRouter::from_config(config.clone())?),
        session: Arc::new(Mutex::new(SessionState::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = axum::Router::new()
        .route("/health", get(health))
        .route("/tools/list", get(tools_list))
        .route("/tools/{name}", post(call_tool))
        .route("/chat", post(chat_turn))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("dossier server listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn tools_list(State(state): State<AppState>) -> Json<Value> {
    let tools: Vec<Value> = state
        .tools
        .tools()
        .iter()
        .map(|t| {
            json!({
                "name": t.name(),
                "description": t.description(),
                "parameters": t.parameters_schema(),
            })
        })
        .collect();
    Json(json!({ "tools": tools }))
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> Response {
    let Some(tool) = state.tools.find(&name) else {
        return error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("unknown tool: {}", name),
        );
    };

    match tool.execute(params, &state.ctx).await {
        Ok(result) => Json(json!({ "result": result })).into_response(),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "tool_error",
            err.to_string(),
        ),
    }
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

async fn chat_turn(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let utterance = req.message.trim();
    if utterance.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "message must not be empty".to_string(),
        );
    }

    let mut session = state.session.lock().await;
    match state.agent.respond(&mut session, utterance).await {
        Ok(reply) => Json(json!({
            "reply": reply,
            "last_project": session.last_project(),
        }))
        .into_response(),
        Err(err) => {
            eprintln!("Warning: chat turn failed: {}", err);
            Json(json!({ "reply": SYSTEM_ERROR_REPLY })).into_response()
        }
    }
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}
